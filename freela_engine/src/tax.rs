//! Tax reference tables and monthly tax rules.
//!
//! The `tax` module holds the versioned reference data the engine
//! prices against: the MEI DAS value, the minimum wage INSS is levied
//! on, the flat company rates and the progressive IR bracket schedule.
//! Tables are keyed by tax year and may be loaded from JSON files so a
//! new year can be adopted without touching the formulas.

use crate::error::{PricingError, Result};
use crate::models::TaxRegime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// One row of the progressive income tax (IR) schedule.
///
/// Tax for an income falling in this bracket is
/// `income * rate - deduction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrBracket {
    /// Inclusive upper bound of the bracket.  `None` marks the open-ended
    /// top bracket.
    pub upper_bound: Option<Decimal>,
    /// Marginal rate as a fraction, e.g. `0.075` for 7.5%.
    pub rate: Decimal,
    /// Amount subtracted after applying `rate`.
    pub deduction: Decimal,
}

impl IrBracket {
    /// `None` when the amount does not fit in a [`Decimal`].
    fn tax_on(&self, income: Decimal) -> Option<Decimal> {
        income.checked_mul(self.rate)?.checked_sub(self.deduction)
    }
}

fn income_too_large() -> PricingError {
    PricingError::invalid("desired_monthly_income", "too large to compute taxes on")
}

/// Reference constants for one tax year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxTable {
    /// Tax year the values are effective for.
    pub year: u16,
    /// Fixed monthly DAS paid by an MEI.
    pub mei_das: Decimal,
    /// National minimum wage, the base for the self-employed INSS.
    pub minimum_wage: Decimal,
    /// INSS rate applied to the minimum wage for AUTONOMO.
    pub inss_rate: Decimal,
    /// Starting Simples Nacional (Anexo III) rate.
    pub simples_rate: Decimal,
    /// Blended Lucro Presumido rate (IR, CSLL, PIS/COFINS and ISS).
    pub presumido_rate: Decimal,
    /// IR schedule ordered from the lowest bracket up.
    pub ir_brackets: Vec<IrBracket>,
}

impl TaxTable {
    /// The 2025 table.
    pub fn brazil_2025() -> Self {
        TaxTable {
            year: 2025,
            mei_das: dec!(81.90),
            minimum_wage: dec!(1518.00),
            inss_rate: dec!(0.20),
            simples_rate: dec!(0.06),
            presumido_rate: dec!(0.1633),
            ir_brackets: vec![
                IrBracket {
                    upper_bound: Some(dec!(2259.20)),
                    rate: Decimal::ZERO,
                    deduction: Decimal::ZERO,
                },
                IrBracket {
                    upper_bound: Some(dec!(2828.65)),
                    rate: dec!(0.075),
                    deduction: dec!(169.44),
                },
                IrBracket {
                    upper_bound: Some(dec!(3751.05)),
                    rate: dec!(0.15),
                    deduction: dec!(381.44),
                },
                IrBracket {
                    upper_bound: Some(dec!(4664.68)),
                    rate: dec!(0.225),
                    deduction: dec!(662.77),
                },
                IrBracket {
                    upper_bound: None,
                    rate: dec!(0.275),
                    deduction: dec!(896.00),
                },
            ],
        }
    }

    /// Parse and validate a table from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: TaxTable = serde_json::from_str(json)
            .map_err(|e| PricingError::config(format!("failed to parse tax table: {}", e)))?;
        table.validate()?;
        Ok(table)
    }

    /// Check the structural invariants the tax rules rely on.
    ///
    /// Brackets must be non-empty with strictly ascending bounds and
    /// exactly one open-ended bracket at the end.  A jump of more than a
    /// cent between adjacent brackets is logged but accepted; the 2025
    /// schedule jumps by about 0.15 at 2828.65.
    pub fn validate(&self) -> Result<()> {
        let year = self.year;
        for (name, value) in [
            ("mei_das", self.mei_das),
            ("minimum_wage", self.minimum_wage),
        ] {
            if value < Decimal::ZERO {
                return Err(PricingError::config(format!(
                    "{}: `{}` must not be negative",
                    year, name
                )));
            }
        }
        for (name, rate) in [
            ("inss_rate", self.inss_rate),
            ("simples_rate", self.simples_rate),
            ("presumido_rate", self.presumido_rate),
        ] {
            check_rate(year, name, rate)?;
        }

        let Some((last, rest)) = self.ir_brackets.split_last() else {
            return Err(PricingError::config(format!(
                "{}: IR schedule has no brackets",
                year
            )));
        };
        if last.upper_bound.is_some() {
            return Err(PricingError::config(format!(
                "{}: last IR bracket must be unbounded",
                year
            )));
        }
        let mut previous: Option<Decimal> = None;
        for (index, bracket) in rest.iter().enumerate() {
            let Some(bound) = bracket.upper_bound else {
                return Err(PricingError::config(format!(
                    "{}: IR bracket {} is unbounded but not last",
                    year, index
                )));
            };
            if previous.map_or(false, |p| bound <= p) {
                return Err(PricingError::config(format!(
                    "{}: IR bracket bounds must be strictly ascending (bracket {})",
                    year, index
                )));
            }
            previous = Some(bound);
        }
        for (index, bracket) in self.ir_brackets.iter().enumerate() {
            check_rate(year, "ir_brackets.rate", bracket.rate)?;
            if bracket.deduction < Decimal::ZERO {
                return Err(PricingError::config(format!(
                    "{}: IR bracket {} has a negative deduction",
                    year, index
                )));
            }
        }

        for (low, high) in self.ir_brackets.iter().zip(self.ir_brackets.iter().skip(1)) {
            let Some(bound) = low.upper_bound else {
                continue;
            };
            if let (Some(below), Some(above)) = (low.tax_on(bound), high.tax_on(bound)) {
                let jump = (above - below).abs();
                if jump > dec!(0.01) {
                    warn!(year, %bound, %jump, "IR schedule is discontinuous at bracket boundary");
                }
            }
        }
        Ok(())
    }

    /// Progressive income tax owed on a monthly income.
    ///
    /// Brackets are scanned from the lowest up and the first one whose
    /// inclusive bound covers `income` applies.  The result never goes
    /// below zero.
    pub fn progressive_ir(&self, income: Decimal) -> Result<Decimal> {
        let bracket = self
            .ir_brackets
            .iter()
            .find(|b| b.upper_bound.map_or(true, |bound| income <= bound));
        match bracket {
            Some(b) => Ok(b
                .tax_on(income)
                .ok_or_else(income_too_large)?
                .max(Decimal::ZERO)),
            None => Ok(Decimal::ZERO),
        }
    }

    /// Monthly tax owed under `regime` for the given income.
    pub fn monthly_taxes(&self, income: Decimal, regime: TaxRegime) -> Result<Decimal> {
        let tax = match regime {
            TaxRegime::Mei => Some(self.mei_das),
            TaxRegime::PjSimples => income.checked_mul(self.simples_rate),
            TaxRegime::PjPresumido => income.checked_mul(self.presumido_rate),
            TaxRegime::Autonomo => self
                .minimum_wage
                .checked_mul(self.inss_rate)
                .and_then(|inss| inss.checked_add(self.progressive_ir(income).ok()?)),
        };
        tax.ok_or_else(income_too_large)
    }
}

fn check_rate(year: u16, name: &str, rate: Decimal) -> Result<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(PricingError::config(format!(
            "{}: `{}` = {} is outside [0, 1]",
            year, name, rate
        )));
    }
    Ok(())
}

/// Tax tables indexed by year.
#[derive(Debug, Clone, Default)]
pub struct TaxTables {
    tables: BTreeMap<u16, TaxTable>,
}

impl TaxTables {
    /// Registry holding only the compiled-in tables.
    pub fn builtin() -> Self {
        let mut tables = TaxTables::default();
        tables.tables.insert(2025, TaxTable::brazil_2025());
        tables
    }

    /// Add a validated table.  A year may only be registered once.
    pub fn insert(&mut self, table: TaxTable) -> Result<()> {
        table.validate()?;
        if self.tables.contains_key(&table.year) {
            return Err(PricingError::config(format!(
                "duplicate tax table for year {}",
                table.year
            )));
        }
        self.tables.insert(table.year, table);
        Ok(())
    }

    pub fn get(&self, year: u16) -> Option<&TaxTable> {
        self.tables.get(&year)
    }

    /// Table for the most recent year available.
    pub fn latest(&self) -> Option<&TaxTable> {
        self.tables.values().next_back()
    }

    pub fn years(&self) -> Vec<u16> {
        self.tables.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Load all tax tables from a directory.
///
/// Every `.json` file in `path` is parsed as a [`TaxTable`].  Unlike a
/// best-effort scan, any unreadable or malformed file aborts the load:
/// the engine cannot price against a table it does not trust.
pub fn load_tax_tables_from_dir(path: &Path) -> Result<TaxTables> {
    if !path.is_dir() {
        return Err(PricingError::config(format!(
            "tax table directory {} does not exist",
            path.display()
        )));
    }
    let io_err = |e: std::io::Error| {
        PricingError::config(format!("failed to read {}: {}", path.display(), e))
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let file = entry.path();
        if entry.file_type().map_err(io_err)?.is_file()
            && file.extension().map_or(false, |ext| ext == "json")
        {
            files.push(file);
        }
    }
    files.sort();

    let mut tables = TaxTables::default();
    for file in files {
        let data = std::fs::read_to_string(&file).map_err(|e| {
            PricingError::config(format!("failed to read {}: {}", file.display(), e))
        })?;
        let table: TaxTable = serde_json::from_str(&data).map_err(|e| {
            PricingError::config(format!("failed to parse {}: {}", file.display(), e))
        })?;
        debug!(year = table.year, file = %file.display(), "loaded tax table");
        tables.insert(table).map_err(|e| match e {
            PricingError::Configuration(msg) => {
                PricingError::config(format!("{}: {}", file.display(), msg))
            }
            other => other,
        })?;
    }
    if tables.is_empty() {
        return Err(PricingError::config(format!(
            "no tax tables found in {}",
            path.display()
        )));
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mei_is_flat() {
        let table = TaxTable::brazil_2025();
        assert_eq!(table.monthly_taxes(Decimal::ZERO, TaxRegime::Mei).unwrap(), dec!(81.90));
        assert_eq!(table.monthly_taxes(dec!(50000), TaxRegime::Mei).unwrap(), dec!(81.90));
    }

    #[test]
    fn test_company_rates() {
        let table = TaxTable::brazil_2025();
        assert_eq!(table.monthly_taxes(dec!(5000), TaxRegime::PjSimples).unwrap(), dec!(300));
        assert_eq!(table.monthly_taxes(dec!(5000), TaxRegime::PjPresumido).unwrap(), dec!(816.5));
    }

    #[test]
    fn test_autonomo_exempt_bracket() {
        let table = TaxTable::brazil_2025();
        assert_eq!(table.progressive_ir(dec!(2000)).unwrap(), Decimal::ZERO);
        assert_eq!(table.monthly_taxes(dec!(2000), TaxRegime::Autonomo).unwrap(), dec!(303.60));
    }

    #[test]
    fn test_autonomo_third_bracket() {
        let table = TaxTable::brazil_2025();
        assert_eq!(table.progressive_ir(dec!(3000)).unwrap(), dec!(68.56));
        assert_eq!(table.monthly_taxes(dec!(3000), TaxRegime::Autonomo).unwrap(), dec!(372.16));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let table = TaxTable::brazil_2025();
        assert_eq!(table.progressive_ir(dec!(2259.20)).unwrap(), Decimal::ZERO);
        // 4664.68 still falls in the 22.5% bracket
        assert_eq!(table.progressive_ir(dec!(4664.68)).unwrap(), dec!(386.783));
        assert_eq!(table.progressive_ir(dec!(10000)).unwrap(), dec!(1854.00));
    }

    #[test]
    fn test_builtin_table_is_valid() {
        assert!(TaxTable::brazil_2025().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unsorted_brackets() {
        let mut table = TaxTable::brazil_2025();
        table.ir_brackets.swap(1, 2);
        assert!(matches!(table.validate(), Err(PricingError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_bounded_top_bracket() {
        let mut table = TaxTable::brazil_2025();
        table.ir_brackets.pop();
        assert!(matches!(table.validate(), Err(PricingError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_empty_and_bad_rates() {
        let mut table = TaxTable::brazil_2025();
        table.ir_brackets.clear();
        assert!(table.validate().is_err());

        let mut table = TaxTable::brazil_2025();
        table.simples_rate = dec!(6);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_second_bracket_bound() {
        let table = TaxTable::brazil_2025();
        assert_eq!(table.progressive_ir(dec!(2827)).unwrap(), dec!(42.585));
        assert_eq!(table.progressive_ir(dec!(2828.65)).unwrap(), dec!(42.70875));
        assert_eq!(table.progressive_ir(dec!(2828.66)).unwrap(), dec!(42.859));
        // the jump at 2828.65 is logged, not rejected
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_overflowing_income_is_an_error() {
        let mut table = TaxTable::brazil_2025();
        table.inss_rate = Decimal::ONE;
        table.minimum_wage = Decimal::MAX;
        let err = table.monthly_taxes(dec!(10000), TaxRegime::Autonomo).unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidInput { field: "desired_monthly_income", .. }
        ));
        assert_eq!(
            TaxTable::brazil_2025().monthly_taxes(Decimal::MAX, TaxRegime::PjSimples).unwrap(),
            Decimal::MAX * dec!(0.06)
        );
    }

    #[test]
    fn test_from_json_str() {
        let json = serde_json::to_string(&TaxTable::brazil_2025()).unwrap();
        let table = TaxTable::from_json_str(&json).unwrap();
        assert_eq!(table, TaxTable::brazil_2025());
        assert!(TaxTable::from_json_str("{\"year\": 2026}").is_err());
    }

    #[test]
    fn test_registry() {
        let mut tables = TaxTables::builtin();
        let mut next = TaxTable::brazil_2025();
        next.year = 2026;
        next.minimum_wage = dec!(1600.00);
        tables.insert(next).unwrap();
        assert_eq!(tables.years(), vec![2025, 2026]);
        assert_eq!(tables.latest().unwrap().year, 2026);
        assert!(tables.insert(TaxTable::brazil_2025()).is_err());
    }

    #[test]
    fn test_missing_directory_is_configuration_error() {
        let err = load_tax_tables_from_dir(Path::new("/nonexistent/tax_tables")).unwrap_err();
        assert!(matches!(err, PricingError::Configuration(_)));
    }
}
