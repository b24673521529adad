//! Key/value slots backing the count snapshot and display preferences.
//!
//! Two access levels: raw strings for scalar preference values, and typed
//! JSON for structured payloads. A JSON slot that fails to decode behaves
//! like an absent one, so a corrupt snapshot can never wedge a caller.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::LocalStore;

impl LocalStore {
    /// Read one slot as a raw string.
    pub async fn read(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool())
            .await
    }

    /// Write one slot, replacing any prior value.
    pub async fn write(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) \
             VALUES (?, ?, datetime('now')) \
             ON CONFLICT(key) DO UPDATE \
             SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Remove one slot. Removing an absent key is a no-op.
    pub async fn remove(&self, key: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Read a JSON-typed slot. A payload that fails structural decoding is
    /// debug-logged and reported as absent.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, sqlx::Error> {
        let Some(raw) = self.read(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::debug!("Discarding malformed value under {key}: {e}");
                Ok(None)
            }
        }
    }

    /// Write a JSON-typed slot.
    pub async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), sqlx::Error> {
        let raw = serde_json::to_string(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        self.write(key, &raw).await
    }
}
