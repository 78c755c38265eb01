//! PostgreSQL store integration
//!
//! This module provides integration with PostgreSQL for the four
//! persisted tables.

pub mod adapter;
pub mod client;
pub mod sql;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
