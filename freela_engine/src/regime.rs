//! Display metadata for each tax regime.
//!
//! The descriptions are reference data for presentation.  Values that
//! depend on the tax year (the MEI DAS amount) are rendered from the
//! [`TaxTable`] in use rather than baked into the text.

use crate::models::TaxRegime;
use crate::tax::TaxTable;
use rust_decimal::Decimal;
use serde::Serialize;

/// Human-readable summary of a tax regime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeInfo {
    pub regime: TaxRegime,
    pub name: &'static str,
    /// How the monthly tax is computed.
    pub cost_model: String,
    /// Annual revenue ceiling for the regime.
    pub revenue_limit: &'static str,
    pub benefits: &'static [&'static str],
    pub drawbacks: &'static [&'static str],
}

/// Look up the metadata for `regime` against the given tax table.
pub fn regime_info(regime: TaxRegime, table: &TaxTable) -> RegimeInfo {
    match regime {
        TaxRegime::Mei => RegimeInfo {
            regime,
            name: "Microempreendedor Individual (MEI)",
            cost_model: format!(
                "Fixed monthly DAS of R$ {} ({})",
                brl(table.mei_das),
                table.year
            ),
            revenue_limit: "Annual revenue up to R$ 81.000",
            benefits: &["Simple", "Cheap", "Few obligations"],
            drawbacks: &["Revenue cap", "At most one employee"],
        },
        TaxRegime::PjSimples => RegimeInfo {
            regime,
            name: "Simples Nacional - Anexo III",
            cost_model: format!(
                "Starting rate of {}% on revenue (6% to 33% as revenue grows)",
                percent(table.simples_rate)
            ),
            revenue_limit: "Annual revenue up to R$ 4,8 million",
            benefits: &["Less paperwork", "Progressive rate"],
            drawbacks: &["Rate grows with revenue", "Ancillary obligations"],
        },
        TaxRegime::PjPresumido => RegimeInfo {
            regime,
            name: "Lucro Presumido",
            cost_model: format!(
                "About {}% on revenue: IR + CSLL + PIS/COFINS + ISS",
                percent(table.presumido_rate)
            ),
            revenue_limit: "Annual revenue up to R$ 78 million",
            benefits: &["Predictable", "Good for high margins"],
            drawbacks: &["More complex", "Costlier than early Simples"],
        },
        TaxRegime::Autonomo => RegimeInfo {
            regime,
            name: "Autônomo (Pessoa Física)",
            cost_model: format!(
                "INSS {}% of the minimum wage (R$ {}) plus progressive IR",
                percent(table.inss_rate),
                brl(table.minimum_wage)
            ),
            revenue_limit: "No limit",
            benefits: &["Flexible", "No company paperwork"],
            drawbacks: &["High progressive IR", "Fewer benefits"],
        },
    }
}

/// Two decimal places with a comma separator, e.g. `81,90`.
fn brl(value: Decimal) -> String {
    format!("{:.2}", value).replace('.', ",")
}

fn percent(rate: Decimal) -> String {
    let pct = (rate * Decimal::ONE_HUNDRED).normalize();
    pct.to_string().replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_regime_has_info() {
        let table = TaxTable::brazil_2025();
        for regime in TaxRegime::ALL {
            let info = regime_info(regime, &table);
            assert_eq!(info.regime, regime);
            assert!(!info.name.is_empty());
            assert!(!info.benefits.is_empty());
            assert!(!info.drawbacks.is_empty());
        }
    }

    #[test]
    fn test_mei_cost_model_follows_table() {
        let mut table = TaxTable::brazil_2025();
        assert_eq!(
            regime_info(TaxRegime::Mei, &table).cost_model,
            "Fixed monthly DAS of R$ 81,90 (2025)"
        );
        table.mei_das = rust_decimal_macros::dec!(86.05);
        table.year = 2026;
        assert!(regime_info(TaxRegime::Mei, &table)
            .cost_model
            .contains("R$ 86,05 (2026)"));
    }

    #[test]
    fn test_rates_rendered_as_percentages() {
        let table = TaxTable::brazil_2025();
        assert!(regime_info(TaxRegime::PjPresumido, &table)
            .cost_model
            .starts_with("About 16,33%"));
        assert!(regime_info(TaxRegime::Autonomo, &table)
            .cost_model
            .contains("INSS 20% of the minimum wage (R$ 1518,00)"));
    }
}
