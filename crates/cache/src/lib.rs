//! transkript-cache – Cache-Aside-Layer
//!
//! Dieses Crate implementiert:
//! - `CacheBackend`: schmale Schnittstelle fuer Key-Value-Caches mit TTL
//! - `MemoryCache`: In-Process-Cache (dashmap) mit Ablaufzeiten
//! - `CachingUserRepository`: legt einen Cache vor jedes `UserRepository`
//!   und implementiert selbst wieder `UserRepository`

pub mod backend;
pub mod error;
pub mod memory;
pub mod repository;
pub mod schluessel;

pub use backend::CacheBackend;
pub use error::{CacheError, CacheResult};
pub use memory::MemoryCache;
pub use repository::{CacheConfig, CachingUserRepository};
