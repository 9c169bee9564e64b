//! Ready-made pricing scenarios.
//!
//! A few typical freelancer profiles, useful as a starting point for a
//! form or as a quick sanity check of a new tax table.

use crate::models::{PricingInput, TaxRegime};
use rust_decimal_macros::dec;
use serde::Serialize;

/// A named example input.
#[derive(Debug, Clone, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub input: PricingInput,
}

pub fn examples() -> Vec<Preset> {
    vec![
        Preset {
            name: "Beginner freelancer (MEI)",
            description: "Junior developer starting out as an MEI",
            input: PricingInput {
                desired_monthly_income: dec!(3000),
                hours_per_day: 6,
                days_per_week: 5,
                vacation_weeks: 2,
                tax_regime: TaxRegime::Mei,
                include_13th: true,
                include_vacation: true,
                monthly_expenses: dec!(300),
                variable_expenses: dec!(100),
                profit_margin_percentage: dec!(15),
            },
        },
        Preset {
            name: "Intermediate freelancer (PJ Simples)",
            description: "Experienced designer billing through Simples Nacional",
            input: PricingInput {
                desired_monthly_income: dec!(7000),
                hours_per_day: 8,
                days_per_week: 5,
                vacation_weeks: 4,
                tax_regime: TaxRegime::PjSimples,
                include_13th: true,
                include_vacation: true,
                monthly_expenses: dec!(800),
                variable_expenses: dec!(400),
                profit_margin_percentage: dec!(25),
            },
        },
        Preset {
            name: "Senior freelancer (PJ Presumido)",
            description: "Seasoned consultant with high revenue",
            input: PricingInput {
                desired_monthly_income: dec!(15000),
                hours_per_day: 8,
                days_per_week: 5,
                vacation_weeks: 6,
                tax_regime: TaxRegime::PjPresumido,
                include_13th: true,
                include_vacation: true,
                monthly_expenses: dec!(2000),
                variable_expenses: dec!(1000),
                profit_margin_percentage: dec!(30),
            },
        },
    ]
}
