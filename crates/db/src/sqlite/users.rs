//! SQLite-Implementierung des UserRepository

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use transkript_core::{Rolle, UserId};

use crate::error::{sqlx_abbilden, DbError};
use crate::models::{BenutzerRecord, BenutzerUpdate, NeuerBenutzer};
use crate::repository::{DbResult, UserRepository};
use crate::sqlite::pool::{transaktion_beginnen, SqliteDb};

const SPALTEN: &str =
    "id, user_id, email, name, password_hash, role, created_at, updated_at, login_at";

impl UserRepository for SqliteDb {
    async fn create(&self, data: NeuerBenutzer) -> DbResult<BenutzerRecord> {
        let pool = self.pool.clone();
        let max_wartezeit = self.grenzen.max_wartezeit;

        self.begrenzt("Benutzer anlegen", async move {
            let user_id = UserId::new();
            let now = Utc::now();
            let now_str = now.to_rfc3339();

            let mut tx = transaktion_beginnen(&pool, max_wartezeit).await?;

            let ergebnis = sqlx::query(
                "INSERT INTO users (user_id, email, name, password_hash, role, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(user_id.to_string())
            .bind(&data.email)
            .bind(&data.name)
            .bind(&data.password_hash)
            .bind(data.role.als_str())
            .bind(&now_str)
            .bind(&now_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| match sqlx_abbilden(e) {
                DbError::Eindeutigkeit(_) => {
                    DbError::Eindeutigkeit(format!("E-Mail '{}' bereits vergeben", data.email))
                }
                andere => andere,
            })?;

            tx.commit().await.map_err(sqlx_abbilden)?;

            Ok(BenutzerRecord {
                id: ergebnis.last_insert_rowid(),
                user_id,
                email: data.email,
                name: data.name,
                password_hash: data.password_hash,
                role: data.role,
                created_at: now,
                updated_at: now,
                login_at: None,
            })
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_abbilden)?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn get_by_external_id(&self, user_id: UserId) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE user_id = ?"))
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_abbilden)?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(sqlx_abbilden)?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn update(&self, user_id: UserId, data: BenutzerUpdate) -> DbResult<BenutzerRecord> {
        if data.ist_leer() {
            return self
                .get_by_external_id(user_id)
                .await?
                .ok_or_else(|| DbError::nicht_gefunden(format!("User {user_id}")));
        }

        // Dynamisches UPDATE – nur gesetzte Felder aendern
        let mut sets: Vec<&str> = Vec::new();
        if data.email.is_some() {
            sets.push("email = ?");
        }
        if data.name.is_some() {
            sets.push("name = ?");
        }
        if data.password_hash.is_some() {
            sets.push("password_hash = ?");
        }
        if data.role.is_some() {
            sets.push("role = ?");
        }
        sets.push("updated_at = ?");
        let sql = format!("UPDATE users SET {} WHERE user_id = ?", sets.join(", "));

        let pool = self.pool.clone();
        let max_wartezeit = self.grenzen.max_wartezeit;

        self.begrenzt("Benutzer aktualisieren", async move {
            let mut tx = transaktion_beginnen(&pool, max_wartezeit).await?;

            let mut q = sqlx::query(&sql);
            if let Some(ref v) = data.email {
                q = q.bind(v);
            }
            if let Some(ref v) = data.name {
                q = q.bind(v);
            }
            if let Some(ref v) = data.password_hash {
                q = q.bind(v);
            }
            if let Some(v) = data.role {
                q = q.bind(v.als_str());
            }
            q = q.bind(Utc::now().to_rfc3339());
            q = q.bind(user_id.to_string());

            let affected = q
                .execute(&mut *tx)
                .await
                .map_err(sqlx_abbilden)?
                .rows_affected();
            if affected == 0 {
                return Err(DbError::nicht_gefunden(format!("User {user_id}")));
            }

            let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE user_id = ?"))
                .bind(user_id.to_string())
                .fetch_one(&mut *tx)
                .await
                .map_err(sqlx_abbilden)?;
            let record = row_to_benutzer(&row)?;

            tx.commit().await.map_err(sqlx_abbilden)?;
            Ok(record)
        })
        .await
    }

    async fn update_last_login(&self, user_id: UserId) -> DbResult<BenutzerRecord> {
        let pool = self.pool.clone();
        let max_wartezeit = self.grenzen.max_wartezeit;

        self.begrenzt("Login-Zeitstempel setzen", async move {
            let mut tx = transaktion_beginnen(&pool, max_wartezeit).await?;

            let affected = sqlx::query("UPDATE users SET login_at = ? WHERE user_id = ?")
                .bind(Utc::now().to_rfc3339())
                .bind(user_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(sqlx_abbilden)?
                .rows_affected();
            if affected == 0 {
                return Err(DbError::nicht_gefunden(format!("User {user_id}")));
            }

            let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE user_id = ?"))
                .bind(user_id.to_string())
                .fetch_one(&mut *tx)
                .await
                .map_err(sqlx_abbilden)?;
            let record = row_to_benutzer(&row)?;

            tx.commit().await.map_err(sqlx_abbilden)?;
            Ok(record)
        })
        .await
    }

    async fn delete(&self, user_id: UserId) -> DbResult<BenutzerRecord> {
        let pool = self.pool.clone();
        let max_wartezeit = self.grenzen.max_wartezeit;

        self.begrenzt("Benutzer loeschen", async move {
            let mut tx = transaktion_beginnen(&pool, max_wartezeit).await?;

            let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE user_id = ?"))
                .bind(user_id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(sqlx_abbilden)?
                .ok_or_else(|| DbError::nicht_gefunden(format!("User {user_id}")))?;
            let record = row_to_benutzer(&row)?;

            sqlx::query("DELETE FROM users WHERE user_id = ?")
                .bind(user_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(sqlx_abbilden)?;

            tx.commit().await.map_err(sqlx_abbilden)?;
            Ok(record)
        })
        .await
    }

    async fn list(&self) -> DbResult<Vec<BenutzerRecord>> {
        let rows = sqlx::query(&format!("SELECT {SPALTEN} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(sqlx_abbilden)?;

        rows.iter().map(row_to_benutzer).collect()
    }
}

fn zeit_parsen(spalte: &str, wert: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(wert)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltige {spalte} '{wert}': {e}")))
}

fn row_to_benutzer(row: &SqliteRow) -> DbResult<BenutzerRecord> {
    use sqlx::Row as _;

    let user_id_str: String = row.try_get("user_id")?;
    let user_id = user_id_str
        .parse::<UserId>()
        .map_err(|e| DbError::intern(e.to_string()))?;

    let role_str: String = row.try_get("role")?;
    let role = role_str
        .parse::<Rolle>()
        .map_err(|e| DbError::intern(e.to_string()))?;

    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let login_at: Option<String> = row.try_get("login_at")?;

    Ok(BenutzerRecord {
        id: row.try_get("id")?,
        user_id,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        password_hash: row.try_get("password_hash")?,
        role,
        created_at: zeit_parsen("created_at", &created_at)?,
        updated_at: zeit_parsen("updated_at", &updated_at)?,
        login_at: login_at
            .as_deref()
            .map(|s| zeit_parsen("login_at", s))
            .transpose()?,
    })
}
