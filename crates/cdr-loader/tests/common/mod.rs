//! Shared helpers for the PostgreSQL integration tests

#![allow(dead_code)]

use cdr_loader::config::{Config, DatabaseConfig};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::path::Path;
use std::time::Duration;
use testcontainers::{
    core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt,
};
use testcontainers_modules::postgres::Postgres;

/// Disposable PostgreSQL container
pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    connection_string: String,
    pool: PgPool,
}

impl TestPostgres {
    pub async fn start() -> Self {
        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .expect("Failed to start PostgreSQL container");

        let host = container.get_host().await.expect("Failed to get host");
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .expect("Failed to get port");

        let connection_string = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&connection_string)
            .await
            .expect("Failed to connect to test database");

        Self {
            _container: container,
            connection_string,
            pool,
        }
    }

    /// Pool for assertions, independent of the loader's own pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Loader configuration pointing at this container
    pub fn config(&self, scan_path: &Path) -> Config {
        let mut config = Config::for_scan_path(scan_path);
        config.database = DatabaseConfig {
            url: self.connection_string.clone(),
            ..DatabaseConfig::default()
        };
        config
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count rows")
    }

    pub async fn table_exists(&self, table: &str) -> bool {
        sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(table)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to look up table")
    }
}

/// Write an extract file into the scan directory
pub fn write_extract(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("Failed to write extract file");
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cdr_loader=debug,sqlx=warn")
        .with_test_writer()
        .try_init();
}
