//! Runtime settings for the command line front end.
//!
//! Resolution order (highest priority first):
//! 1. CLI flags
//! 2. Environment variables (`FREELA_*`, read by clap)
//! 3. Compiled defaults: built-in tax tables, latest year

use crate::engine::PricingEngine;
use crate::error::Result;
use crate::tax::{load_tax_tables_from_dir, TaxTables};
use std::path::PathBuf;
use tracing::info;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "freela_engine=info";

#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Directory of `*.json` tax tables.  `None` uses the built-in tables.
    pub tax_table_dir: Option<PathBuf>,
    /// Tax year to price against.  `None` picks the latest available.
    pub tax_year: Option<u16>,
}

impl Settings {
    /// Load the tax tables these settings point at.
    pub fn load_tax_tables(&self) -> Result<TaxTables> {
        match &self.tax_table_dir {
            Some(dir) => {
                let tables = load_tax_tables_from_dir(dir)?;
                info!(dir = %dir.display(), years = ?tables.years(), "loaded tax tables");
                Ok(tables)
            }
            None => Ok(TaxTables::builtin()),
        }
    }

    /// Build the engine for the configured year.
    pub fn build_engine(&self) -> Result<PricingEngine> {
        let tables = self.load_tax_tables()?;
        PricingEngine::for_year(&tables, self.tax_year)
    }
}
