//! Final count report
//!
//! This module defines the read-only report emitted by the `Verifying`
//! stage for operator sanity checks.

use crate::domain::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row counts of the finalized tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalCounts {
    /// When the counts were taken
    pub verified_at: DateTime<Utc>,

    /// Rows in `products`
    pub products: u64,

    /// Rows in `exclusivity`
    pub exclusivity: u64,

    /// Rows in `patent`
    pub patents: u64,

    /// Rows in `sales`
    pub sales: u64,

    /// Sales rows with a non-null linking identifier
    pub sales_linked: u64,
}

impl FinalCounts {
    /// Row count of one table
    pub fn rows(&self, table: Table) -> u64 {
        match table {
            Table::Products => self.products,
            Table::Exclusivity => self.exclusivity,
            Table::Patents => self.patents,
            Table::Sales => self.sales,
        }
    }

    /// Share of sales rows linked to an application number, in percent
    pub fn link_rate(&self) -> f64 {
        if self.sales == 0 {
            return 0.0;
        }
        (self.sales_linked as f64 / self.sales as f64) * 100.0
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📊 Final Counts\n");
        summary.push_str(&format!("  Verified at: {}\n", self.verified_at));
        for table in Table::ALL {
            summary.push_str(&format!("  {:<12} {}\n", table.name(), self.rows(table)));
        }
        summary.push_str(&format!(
            "  Sales linked to an application: {} ({:.2}%)\n",
            self.sales_linked,
            self.link_rate()
        ));
        summary
    }
}
