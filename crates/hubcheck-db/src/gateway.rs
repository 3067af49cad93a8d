//! Database gateway.
//!
//! [`SqlGateway`] opens a fresh connection for every call, runs one
//! statement with all descriptor parameters bound, and closes the
//! connection before returning, whatever the outcome.

use crate::decode;
use crate::descriptor::{Dialect, QueryDescriptor, SqlParam};
use crate::error::{DatabaseError, Result};
use crate::record::Record;
use async_trait::async_trait;
use hubcheck_core::{DatabaseConfig, DbEngine};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlSslMode};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Database, Encode, Type};
use std::future::Future;
use std::time::Duration;

/// Executes query descriptors against some database.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Dialect descriptors must be rendered for.
    fn dialect(&self) -> Dialect;

    /// Run a row-returning statement.
    async fn execute(&self, query: &QueryDescriptor) -> Result<Vec<Record>>;

    /// Run a DML statement and return the number of affected rows.
    async fn execute_statement(&self, query: &QueryDescriptor) -> Result<u64>;

    /// Run a statement and return its first row, if any.
    async fn fetch_optional(&self, query: &QueryDescriptor) -> Result<Option<Record>> {
        Ok(self.execute(query).await?.into_iter().next())
    }
}

/// Connection-per-call gateway over sqlx.
#[derive(Clone)]
pub struct SqlGateway {
    config: DatabaseConfig,
}

impl std::fmt::Debug for SqlGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlGateway")
            .field("engine", &self.config.engine)
            .field("host", &self.config.host)
            .field("name", &self.config.name)
            .finish_non_exhaustive()
    }
}

impl SqlGateway {
    /// Create a gateway from database settings. No connection is opened.
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Gateway over a SQLite file, created when missing.
    #[must_use]
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self::new(DatabaseConfig {
            engine: DbEngine::Sqlite,
            name: path.into(),
            ..DatabaseConfig::default()
        })
    }

    fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.config.connect_timeout_secs)
    }

    async fn connect<C, F>(&self, connecting: F) -> Result<C>
    where
        F: Future<Output = std::result::Result<C, sqlx::Error>>,
    {
        let timeout = self.connect_timeout();
        match tokio::time::timeout(timeout, connecting).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(DatabaseError::Connection(format!(
                "{} at {}: {e}",
                self.config.engine,
                self.endpoint()
            ))),
            Err(_) => Err(DatabaseError::Connection(format!(
                "{} at {}: connect timed out after {}s",
                self.config.engine,
                self.endpoint(),
                timeout.as_secs()
            ))),
        }
    }

    fn endpoint(&self) -> String {
        match self.config.engine {
            DbEngine::Sqlite => self.config.name.clone(),
            _ => format!(
                "{}:{}/{}",
                self.config.host,
                self.config.port(),
                self.config.name
            ),
        }
    }

    async fn connect_pg(&self) -> Result<PgConnection> {
        let c = &self.config;
        let options = PgConnectOptions::new()
            .host(&c.host)
            .port(c.port())
            .username(&c.user)
            .password(&c.password)
            .database(&c.name)
            .ssl_mode(if c.ssl {
                PgSslMode::Require
            } else {
                PgSslMode::Disable
            });
        self.connect(options.connect()).await
    }

    async fn connect_mysql(&self) -> Result<MySqlConnection> {
        let c = &self.config;
        let options = MySqlConnectOptions::new()
            .host(&c.host)
            .port(c.port())
            .username(&c.user)
            .password(&c.password)
            .database(&c.name)
            .ssl_mode(if c.ssl {
                MySqlSslMode::Required
            } else {
                MySqlSslMode::Disabled
            });
        self.connect(options.connect()).await
    }

    async fn connect_sqlite(&self) -> Result<SqliteConnection> {
        let options = SqliteConnectOptions::new()
            .filename(&self.config.name)
            .create_if_missing(true);
        self.connect(options.connect()).await
    }

    fn check_dialect(&self, query: &QueryDescriptor) -> Result<()> {
        if query.dialect() == self.dialect() {
            Ok(())
        } else {
            Err(DatabaseError::Query(format!(
                "query rendered for {} but gateway targets {}",
                query.dialect(),
                self.dialect()
            )))
        }
    }
}

#[async_trait]
impl QueryExecutor for SqlGateway {
    fn dialect(&self) -> Dialect {
        self.config.engine.into()
    }

    async fn execute(&self, query: &QueryDescriptor) -> Result<Vec<Record>> {
        self.check_dialect(query)?;
        tracing::debug!("Executing query: {}", query);

        let records = match self.config.engine {
            DbEngine::Postgres => {
                let mut conn = self.connect_pg().await?;
                let result = bind_params(sqlx::query(query.sql()), query.params())
                    .fetch_all(&mut conn)
                    .await;
                close_quietly(conn).await;
                result
                    .map_err(query_error)?
                    .iter()
                    .map(decode::pg_row)
                    .collect::<Result<Vec<_>>>()?
            }
            DbEngine::Mysql => {
                let mut conn = self.connect_mysql().await?;
                let result = bind_params(sqlx::query(query.sql()), query.params())
                    .fetch_all(&mut conn)
                    .await;
                close_quietly(conn).await;
                result
                    .map_err(query_error)?
                    .iter()
                    .map(decode::mysql_row)
                    .collect::<Result<Vec<_>>>()?
            }
            DbEngine::Sqlite => {
                let mut conn = self.connect_sqlite().await?;
                let result = bind_params(sqlx::query(query.sql()), query.params())
                    .fetch_all(&mut conn)
                    .await;
                close_quietly(conn).await;
                result
                    .map_err(query_error)?
                    .iter()
                    .map(decode::sqlite_row)
                    .collect::<Result<Vec<_>>>()?
            }
        };

        tracing::info!("Query executed: found {} rows", records.len());
        Ok(records)
    }

    async fn execute_statement(&self, query: &QueryDescriptor) -> Result<u64> {
        self.check_dialect(query)?;
        tracing::debug!("Executing statement: {}", query);

        let affected = match self.config.engine {
            DbEngine::Postgres => {
                let mut conn = self.connect_pg().await?;
                let result = bind_params(sqlx::query(query.sql()), query.params())
                    .execute(&mut conn)
                    .await;
                close_quietly(conn).await;
                result.map_err(query_error)?.rows_affected()
            }
            DbEngine::Mysql => {
                let mut conn = self.connect_mysql().await?;
                let result = bind_params(sqlx::query(query.sql()), query.params())
                    .execute(&mut conn)
                    .await;
                close_quietly(conn).await;
                result.map_err(query_error)?.rows_affected()
            }
            DbEngine::Sqlite => {
                let mut conn = self.connect_sqlite().await?;
                let result = bind_params(sqlx::query(query.sql()), query.params())
                    .execute(&mut conn)
                    .await;
                close_quietly(conn).await;
                result.map_err(query_error)?.rows_affected()
            }
        };

        tracing::info!("Statement executed: {} rows affected", affected);
        Ok(affected)
    }
}

fn bind_params<'q, DB>(
    mut query: Query<'q, DB, <DB as Database>::Arguments<'q>>,
    params: &'q [SqlParam],
) -> Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    bool: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    &'q str: Encode<'q, DB> + Type<DB>,
    Option<&'q str>: Encode<'q, DB> + Type<DB>,
{
    for param in params {
        query = match param {
            SqlParam::Null => query.bind(None::<&'q str>),
            SqlParam::Bool(v) => query.bind(*v),
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Float(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

fn query_error(err: sqlx::Error) -> DatabaseError {
    DatabaseError::Query(err.to_string())
}

async fn close_quietly<C: Connection>(conn: C) {
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close database connection: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::QueryBuilder;
    use tempfile::TempDir;

    fn gateway(tmp: &TempDir) -> SqlGateway {
        SqlGateway::sqlite(tmp.path().join("hub.db").display().to_string())
    }

    async fn seed(gw: &SqlGateway) {
        gw.execute_statement(&QueryDescriptor::raw(
            Dialect::Sqlite,
            "CREATE TABLE customers (id INTEGER PRIMARY KEY, last_name TEXT, balance REAL, avatar BLOB, vip BOOLEAN)",
        ))
        .await
        .expect("create table");

        let mut insert = QueryBuilder::new(Dialect::Sqlite);
        insert
            .push("INSERT INTO customers (last_name, balance, avatar, vip) VALUES (")
            .push_bind("O'Brien")
            .push(", ")
            .push_bind(12.5)
            .push(", X'CAFE', ")
            .push_bind(true)
            .push(")");
        let affected = gw
            .execute_statement(&insert.build())
            .await
            .expect("insert row");
        assert_eq!(affected, 1);
    }

    #[tokio::test]
    async fn test_sqlite_round_trip_with_bound_quote() {
        let tmp = TempDir::new().expect("create temp dir");
        let gw = gateway(&tmp);
        seed(&gw).await;

        let mut select = QueryBuilder::new(Dialect::Sqlite);
        select
            .push("SELECT id, last_name, balance, avatar, vip FROM customers WHERE last_name = ")
            .push_bind("O'Brien");
        let rows = gw.execute(&select.build()).await.expect("select");

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.get_str("last_name").as_deref(), Some("O'Brien"));
        assert_eq!(row.get_i64("id"), Some(1));
        assert_eq!(row.get("balance").and_then(serde_json::Value::as_f64), Some(12.5));
        assert_eq!(row.get_str("avatar").as_deref(), Some("cafe"));
        assert_eq!(row.get_bool("vip"), Some(true));
    }

    #[tokio::test]
    async fn test_null_and_empty_results() {
        let tmp = TempDir::new().expect("create temp dir");
        let gw = gateway(&tmp);
        seed(&gw).await;

        let rows = gw
            .execute(&QueryDescriptor::raw(
                Dialect::Sqlite,
                "SELECT NULL AS nothing, COUNT(*) AS total FROM customers",
            ))
            .await
            .expect("select");
        assert!(rows[0].is_null("nothing"));
        assert_eq!(rows[0].get_i64("total"), Some(1));

        let mut missing = QueryBuilder::new(Dialect::Sqlite);
        missing
            .push("SELECT * FROM customers WHERE id = ")
            .push_bind(99_i64);
        assert!(gw
            .fetch_optional(&missing.build())
            .await
            .expect("select")
            .is_none());
    }

    #[tokio::test]
    async fn test_rejected_statement_is_query_error() {
        let tmp = TempDir::new().expect("create temp dir");
        let gw = gateway(&tmp);

        let err = gw
            .execute(&QueryDescriptor::raw(
                Dialect::Sqlite,
                "SELECT * FROM no_such_table",
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Query(_)));

        // the gateway stays usable after a failure
        let rows = gw
            .execute(&QueryDescriptor::raw(Dialect::Sqlite, "SELECT 1 AS one"))
            .await
            .expect("select after failure");
        assert_eq!(rows[0].get_i64("one"), Some(1));
    }

    #[tokio::test]
    async fn test_dialect_mismatch_is_rejected() {
        let tmp = TempDir::new().expect("create temp dir");
        let gw = gateway(&tmp);
        let err = gw
            .execute(&QueryDescriptor::raw(Dialect::Postgres, "SELECT 1"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("rendered for postgres"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let gw = SqlGateway::new(DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: Some(1),
            connect_timeout_secs: 2,
            ..DatabaseConfig::default()
        });
        let err = gw
            .execute(&QueryDescriptor::raw(Dialect::Postgres, "SELECT 1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Connection(_)));
    }

    #[test]
    fn test_endpoint_uses_engine_default_port() {
        let gw = SqlGateway::new(DatabaseConfig {
            engine: DbEngine::Mysql,
            host: "testdata-db".to_string(),
            name: "hub_test_data".to_string(),
            ..DatabaseConfig::default()
        });
        assert_eq!(gw.endpoint(), "testdata-db:3306/hub_test_data");
    }
}
