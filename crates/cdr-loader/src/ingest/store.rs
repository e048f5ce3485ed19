//! Relational store contract used by the ingestion driver
//!
//! The driver owns exactly one session for the whole run and opens at most
//! one transaction at a time on it.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use super::statement::{CreateTableStatement, InsertStatement};

/// A store connection with explicit transaction control
#[async_trait]
pub trait StoreSession: Send {
    /// Open a transaction; fails if one is already open
    async fn begin(&mut self) -> Result<(), sqlx::Error>;

    /// Execute the guarded create; returns whether the table was new
    async fn create_table(&mut self, statement: &CreateTableStatement) -> Result<bool, sqlx::Error>;

    /// Execute the bulk insert; returns rows affected
    async fn insert(&mut self, statement: &InsertStatement) -> Result<u64, sqlx::Error>;

    async fn commit(&mut self) -> Result<(), sqlx::Error>;

    /// Roll back the open transaction, if any
    async fn rollback(&mut self) -> Result<(), sqlx::Error>;

    /// Release the connection; any open transaction is rolled back
    async fn close(&mut self) -> Result<(), sqlx::Error>;
}

/// PostgreSQL session over a connection pool
pub struct PgSession {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgSession {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, tx: None }
    }

    fn open_tx(&mut self) -> Result<&mut Transaction<'static, Postgres>, sqlx::Error> {
        self.tx
            .as_mut()
            .ok_or_else(|| sqlx::Error::Protocol("no open transaction".to_string()))
    }
}

#[async_trait]
impl StoreSession for PgSession {
    async fn begin(&mut self) -> Result<(), sqlx::Error> {
        if self.tx.is_some() {
            return Err(sqlx::Error::Protocol(
                "transaction already open".to_string(),
            ));
        }
        self.tx = Some(self.pool.begin().await?);
        Ok(())
    }

    async fn create_table(&mut self, statement: &CreateTableStatement) -> Result<bool, sqlx::Error> {
        let tx = self.open_tx()?;

        let existed: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(statement.table())
            .fetch_one(&mut **tx)
            .await?;

        let sql = statement.sql();
        debug!(sql = %sql, "Executing create");
        sqlx::query(&sql).execute(&mut **tx).await?;

        Ok(!existed)
    }

    async fn insert(&mut self, statement: &InsertStatement) -> Result<u64, sqlx::Error> {
        let tx = self.open_tx()?;
        let mut rows_affected = 0;

        for chunk in statement.chunks() {
            let mut builder = statement.query_builder(chunk);
            let result = builder.build().execute(&mut **tx).await?;
            rows_affected += result.rows_affected();
        }

        Ok(rows_affected)
    }

    async fn commit(&mut self) -> Result<(), sqlx::Error> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| sqlx::Error::Protocol("no open transaction".to_string()))?;
        tx.commit().await
    }

    async fn rollback(&mut self) -> Result<(), sqlx::Error> {
        match self.tx.take() {
            Some(tx) => tx.rollback().await,
            None => Ok(()),
        }
    }

    async fn close(&mut self) -> Result<(), sqlx::Error> {
        let rolled_back = self.rollback().await;
        self.pool.close().await;
        rolled_back
    }
}
