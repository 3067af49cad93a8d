//! Dual-channel verification: a UI signal followed by a database row.

use crate::context::CommandContext;
use crate::error::{CommandError, Result};
use hubcheck_db::{QueryDescriptor, QueryExecutor, Record};
use std::future::Future;

impl CommandContext {
    /// Run `ui_check`, then poll `db_query` on the main database until the
    /// row shows up.
    ///
    /// The UI check goes first; when it fails the database is not queried.
    pub async fn verify_dual<F, E>(
        &self,
        ui_check: F,
        db_query: &QueryDescriptor,
        what: &str,
    ) -> Result<Record>
    where
        F: Future<Output = std::result::Result<(), E>>,
        E: Into<CommandError>,
    {
        self.verify_dual_in(self.db(), ui_check, db_query, what)
            .await
    }

    /// [`CommandContext::verify_dual`] against `db`, e.g. the test-data
    /// database for customers and products.
    pub async fn verify_dual_in<F, E>(
        &self,
        db: &dyn QueryExecutor,
        ui_check: F,
        db_query: &QueryDescriptor,
        what: &str,
    ) -> Result<Record>
    where
        F: Future<Output = std::result::Result<(), E>>,
        E: Into<CommandError>,
    {
        ui_check.await.map_err(Into::into)?;
        tracing::debug!("UI confirmed {}, checking database", what);
        self.await_row_in(db, db_query, what).await
    }
}
