//! Data models for the Freela Engine.
//!
//! The `models` module defines the serialisable input and output
//! records of a pricing calculation.  They derive `Serialize` and
//! `Deserialize` so a presentation layer can read them from a form or
//! forward them over any transport without the engine knowing about it.

use crate::error::{PricingError, Result};
use crate::regime::RegimeInfo;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Brazilian tax regime a freelancer bills under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxRegime {
    /// Microempreendedor Individual: fixed monthly DAS payment.
    Mei,
    /// Simples Nacional, Anexo III starting rate.
    PjSimples,
    /// Lucro Presumido blended rate.
    PjPresumido,
    /// Self-employed individual: INSS on the minimum wage plus progressive IR.
    Autonomo,
}

impl TaxRegime {
    /// Every regime, in display order.
    pub const ALL: [TaxRegime; 4] = [
        TaxRegime::Mei,
        TaxRegime::PjSimples,
        TaxRegime::PjPresumido,
        TaxRegime::Autonomo,
    ];

    /// Canonical wire name, e.g. `"PJ_SIMPLES"`.
    pub fn code(&self) -> &'static str {
        match self {
            TaxRegime::Mei => "MEI",
            TaxRegime::PjSimples => "PJ_SIMPLES",
            TaxRegime::PjPresumido => "PJ_PRESUMIDO",
            TaxRegime::Autonomo => "AUTONOMO",
        }
    }
}

impl fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TaxRegime {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        TaxRegime::ALL
            .into_iter()
            .find(|regime| regime.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let valid: Vec<&str> = TaxRegime::ALL.iter().map(|r| r.code()).collect();
                PricingError::invalid(
                    "tax_regime",
                    format!("unknown regime {:?}, expected one of {}", s, valid.join(", ")),
                )
            })
    }
}

fn default_vacation_weeks() -> u32 {
    4
}

fn default_true() -> bool {
    true
}

fn default_profit_margin() -> Decimal {
    dec!(20)
}

/// Input to the pricing engine.
///
/// Omitted optional fields take the same defaults the calculator form
/// starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingInput {
    /// Net monthly pay the freelancer wants to take home (pró-labore).
    pub desired_monthly_income: Decimal,
    pub hours_per_day: u32,
    pub days_per_week: u32,
    #[serde(default = "default_vacation_weeks")]
    pub vacation_weeks: u32,
    pub tax_regime: TaxRegime,
    /// Provision one extra monthly income per year (13th salary).
    #[serde(default = "default_true")]
    pub include_13th: bool,
    /// Provision the one-third vacation bonus.
    #[serde(default = "default_true")]
    pub include_vacation: bool,
    #[serde(default)]
    pub monthly_expenses: Decimal,
    #[serde(default)]
    pub variable_expenses: Decimal,
    /// Desired margin on top of costs, as a percentage in `[0, 100)`.
    #[serde(default = "default_profit_margin")]
    pub profit_margin_percentage: Decimal,
}

impl PricingInput {
    /// Baseline scenario used when comparing regimes for a given income:
    /// full-time week, four weeks off, both provisions, modest expenses and
    /// a 20% margin.
    pub fn baseline(desired_monthly_income: Decimal, tax_regime: TaxRegime) -> Self {
        PricingInput {
            desired_monthly_income,
            hours_per_day: 8,
            days_per_week: 5,
            vacation_weeks: 4,
            tax_regime,
            include_13th: true,
            include_vacation: true,
            monthly_expenses: dec!(500),
            variable_expenses: dec!(200),
            profit_margin_percentage: dec!(20),
        }
    }

    /// Same input under a different regime.
    pub fn with_regime(&self, tax_regime: TaxRegime) -> Self {
        PricingInput {
            tax_regime,
            ..self.clone()
        }
    }
}

/// Suggested fixed prices for projects of typical sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSuggestions {
    /// Roughly 30 hours of work.
    pub small: Decimal,
    /// Roughly 100 hours of work.
    pub medium: Decimal,
    /// Roughly 200 hours of work.
    pub large: Decimal,
}

/// The result of a pricing calculation.
///
/// Currency figures keep full precision; call
/// [`PricingResult::rounded_to_cents`] before display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
    pub weekly_rate: Decimal,
    /// Amount to bill per month, margin included.
    pub monthly_rate: Decimal,

    /// Income, taxes, provisions and expenses for one month.
    pub total_monthly_costs: Decimal,
    pub total_annual_costs: Decimal,
    pub monthly_taxes: Decimal,
    pub monthly_provisions: Decimal,
    pub net_monthly_income: Decimal,

    /// Rounded to the nearest hour.
    pub working_hours_per_month: u32,
    /// Rounded to the nearest day.
    pub working_days_per_month: u32,
    pub tax_regime: TaxRegime,
    /// Year of the tax table the figures were computed with.
    pub tax_year: u16,

    pub projects: ProjectSuggestions,
}

fn cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl PricingResult {
    /// Copy of this result with every currency figure rounded to cents.
    pub fn rounded_to_cents(&self) -> Self {
        PricingResult {
            hourly_rate: cents(self.hourly_rate),
            daily_rate: cents(self.daily_rate),
            weekly_rate: cents(self.weekly_rate),
            monthly_rate: cents(self.monthly_rate),
            total_monthly_costs: cents(self.total_monthly_costs),
            total_annual_costs: cents(self.total_annual_costs),
            monthly_taxes: cents(self.monthly_taxes),
            monthly_provisions: cents(self.monthly_provisions),
            net_monthly_income: cents(self.net_monthly_income),
            projects: ProjectSuggestions {
                small: cents(self.projects.small),
                medium: cents(self.projects.medium),
                large: cents(self.projects.large),
            },
            ..self.clone()
        }
    }
}

/// One row of a side-by-side regime comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeComparison {
    pub regime: TaxRegime,
    pub info: RegimeInfo,
    pub monthly_taxes: Decimal,
    pub hourly_rate: Decimal,
    pub total_monthly_costs: Decimal,
}
