//! Freela Engine library crate.
//!
//! This crate exposes the freelancer pricing engine as reusable
//! modules.  External applications may depend on the `freela_engine`
//! crate and call [`engine::PricingEngine::calculate`] directly; the
//! bundled binary wraps the same engine in a JSON command line tool.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod presets;
pub mod regime;
pub mod tax;

pub use engine::PricingEngine;
pub use error::{PricingError, Result};
pub use models::{PricingInput, PricingResult, ProjectSuggestions, RegimeComparison, TaxRegime};
pub use regime::RegimeInfo;
pub use tax::{IrBracket, TaxTable, TaxTables};
