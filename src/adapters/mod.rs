//! External system integrations for Formulary.
//!
//! This module provides adapters for the systems around the pipeline:
//!
//! - [`source`] - Delimited extract reader with per-source encodings
//! - [`database`] - Store abstraction layer (trait-based)
//! - [`postgresql`] - PostgreSQL implementation
//! - [`memory`] - In-memory implementation for dry runs and tests
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing without a database. The pipeline only ever sees a
//! [`database::TableStore`].
//!
//! ```rust
//! use formulary::adapters::database::TableStore;
//! use formulary::adapters::memory::MemoryStore;
//! use formulary::domain::Table;
//!
//! # async fn example() -> formulary::domain::Result<()> {
//! let store = MemoryStore::new();
//! store.ensure_schema().await?;
//! assert_eq!(store.count_rows(Table::Products).await?, 0);
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;
pub mod source;
