//! Store abstraction layer
//!
//! This module provides a trait-based abstraction for the relational store,
//! allowing Formulary to load into PostgreSQL or into memory.

pub mod factory;
pub mod traits;

pub use factory::create_table_store;
pub use traits::TableStore;
