//! SurrealDB implementation of the shared usage-counter store.
//!
//! One `counter` record per namespaced key (the record id IS the key).
//! Increments run as a single `UPSERT` statement, which SurrealDB
//! executes atomically, so concurrent writers from multiple server
//! instances never lose updates.

use chrono::{DateTime, Duration, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::{TesseraError, TesseraResult};
use tessera_core::quota::QuotaStore;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CounterRow {
    value: i64,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct ValueRow {
    value: i64,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB-backed counter store.
#[derive(Clone)]
pub struct SurrealQuotaStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealQuotaStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Remove counters whose expiry has passed. Returns the number of
    /// keys removed.
    pub async fn cleanup_expired(&self) -> TesseraResult<u64> {
        // Count expired counters first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM counter \
                 WHERE expires_at != NONE AND expires_at < time::now() \
                 GROUP ALL",
            )
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE counter WHERE expires_at != NONE AND expires_at < time::now()")
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}

impl<C: Connection> QuotaStore for SurrealQuotaStore<C> {
    async fn get(&self, key: &str) -> TesseraResult<Option<u64>> {
        let mut result = self
            .db
            .query("SELECT `value`, expires_at FROM type::record('counter', $key)")
            .bind(("key", key.to_string()))
            .await
            .map_err(|e| TesseraError::CounterStore(e.to_string()))?;

        let rows: Vec<CounterRow> = result
            .take(0)
            .map_err(|e| TesseraError::CounterStore(e.to_string()))?;

        let row = match rows.into_iter().next() {
            Some(row) => row,
            None => return Ok(None),
        };

        // An expired key reads as absent; the sweep removes it later.
        if let Some(expires_at) = row.expires_at {
            if expires_at <= Utc::now() {
                return Ok(None);
            }
        }

        Ok(Some(row.value.max(0) as u64))
    }

    async fn increment(&self, key: &str, amount: i64) -> TesseraResult<u64> {
        // Single statement — atomic under SurrealDB's per-statement
        // execution, clamped so counters never go negative.
        let mut result = self
            .db
            .query(
                "UPSERT type::record('counter', $key) SET \
                 value = math::max([(value ?? 0) + $amount, 0]), \
                 updated_at = time::now() \
                 RETURN `value`",
            )
            .bind(("key", key.to_string()))
            .bind(("amount", amount))
            .await
            .map_err(|e| TesseraError::CounterStore(e.to_string()))?;

        let rows: Vec<ValueRow> = result
            .take(0)
            .map_err(|e| TesseraError::CounterStore(e.to_string()))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| TesseraError::CounterStore(format!("no counter row for key {key}")))?;

        Ok(row.value.max(0) as u64)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> TesseraResult<()> {
        let expires_at = Utc::now() + Duration::seconds(ttl_secs as i64);

        self.db
            .query("UPDATE type::record('counter', $key) SET expires_at = $expires_at")
            .bind(("key", key.to_string()))
            .bind(("expires_at", expires_at))
            .await
            .map_err(|e| TesseraError::CounterStore(e.to_string()))?;

        Ok(())
    }
}
