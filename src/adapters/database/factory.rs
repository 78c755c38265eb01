//! Store factory
//!
//! This module creates the table store selected by configuration.

use crate::adapters::database::traits::TableStore;
use crate::adapters::memory::MemoryStore;
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::{DatabaseTarget, FormularyConfig};
use crate::domain::{FormularyError, Result};
use std::sync::Arc;

/// Create a table store based on the configuration
///
/// This factory function examines the effective target (a dry run always
/// selects the in-memory store) and creates the matching implementation.
///
/// # Arguments
///
/// * `config` - The Formulary configuration
///
/// # Returns
///
/// Returns an Arc-wrapped trait object that implements TableStore
///
/// # Errors
///
/// Returns an error if the store cannot be created
pub fn create_table_store(config: &FormularyConfig) -> Result<Arc<dyn TableStore>> {
    match config.effective_target() {
        DatabaseTarget::Memory => {
            tracing::info!("Creating in-memory store");
            Ok(Arc::new(MemoryStore::new()) as Arc<dyn TableStore>)
        }
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                FormularyError::Configuration(
                    "postgresql configuration is required when database_target = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL store");
            let client = PostgreSQLClient::new(pg_config.clone())?;
            Ok(Arc::new(PostgreSQLAdapter::new(client)) as Arc<dyn TableStore>)
        }
    }
}
