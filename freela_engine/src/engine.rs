//! Pricing computation engine.
//!
//! The `engine` module turns a [`PricingInput`] into a
//! [`PricingResult`].  A [`PricingEngine`] owns nothing but an immutable
//! [`TaxTable`], so one instance can be shared freely across threads.
//! Batch and comparison runs use the [`rayon`] crate to price
//! independent inputs in parallel.

use crate::error::{PricingError, Result};
use crate::models::{PricingInput, PricingResult, ProjectSuggestions, RegimeComparison, TaxRegime};
use crate::regime::{regime_info, RegimeInfo};
use crate::tax::{TaxTable, TaxTables};
use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::{debug, instrument, warn};

const WEEKS_PER_YEAR: u32 = 52;
const HOURS_PER_DAY: u32 = 24;
const MONTHS_PER_YEAR: Decimal = dec!(12);

const SMALL_PROJECT_HOURS: Decimal = dec!(30);
const MEDIUM_PROJECT_HOURS: Decimal = dec!(100);
const LARGE_PROJECT_HOURS: Decimal = dec!(200);

/// Stateless rate calculator bound to one tax table.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    table: TaxTable,
}

impl Default for PricingEngine {
    fn default() -> Self {
        PricingEngine {
            table: TaxTable::brazil_2025(),
        }
    }
}

impl PricingEngine {
    /// Create an engine pricing against `table`.
    pub fn new(table: TaxTable) -> Result<Self> {
        table.validate()?;
        Ok(PricingEngine { table })
    }

    /// Create an engine for `year` out of a table registry.  With no year
    /// the most recent table is used.
    pub fn for_year(tables: &TaxTables, year: Option<u16>) -> Result<Self> {
        let table = match year {
            Some(year) => tables.get(year).ok_or_else(|| {
                PricingError::config(format!(
                    "no tax table for year {} (available: {:?})",
                    year,
                    tables.years()
                ))
            })?,
            None => tables
                .latest()
                .ok_or_else(|| PricingError::config("no tax tables loaded"))?,
        };
        Ok(PricingEngine {
            table: table.clone(),
        })
    }

    pub fn table(&self) -> &TaxTable {
        &self.table
    }

    /// Display metadata for `regime` under this engine's tax year.
    pub fn regime_info(&self, regime: TaxRegime) -> RegimeInfo {
        regime_info(regime, &self.table)
    }

    /// Monthly tax owed on `income` under `regime`.
    pub fn monthly_taxes(&self, income: Decimal, regime: TaxRegime) -> Result<Decimal> {
        self.table.monthly_taxes(income, regime)
    }

    /// Reject inputs the formulas cannot price.  Runs before any
    /// computation so no partial result is ever produced.
    pub fn validate(input: &PricingInput) -> Result<()> {
        for (field, value) in [
            ("desired_monthly_income", input.desired_monthly_income),
            ("monthly_expenses", input.monthly_expenses),
            ("variable_expenses", input.variable_expenses),
        ] {
            if value < Decimal::ZERO {
                return Err(PricingError::invalid(field, "must not be negative"));
            }
        }
        if !(1..=HOURS_PER_DAY).contains(&input.hours_per_day) {
            return Err(PricingError::invalid("hours_per_day", "must be between 1 and 24"));
        }
        if !(1..=7).contains(&input.days_per_week) {
            return Err(PricingError::invalid("days_per_week", "must be between 1 and 7"));
        }
        if input.vacation_weeks >= WEEKS_PER_YEAR {
            let reason = if input.vacation_weeks == WEEKS_PER_YEAR {
                "leaves no working weeks in the year"
            } else {
                "must be between 0 and 52"
            };
            return Err(PricingError::invalid("vacation_weeks", reason));
        }
        let margin = input.profit_margin_percentage;
        if margin < Decimal::ZERO || margin >= Decimal::ONE_HUNDRED {
            return Err(PricingError::invalid(
                "profit_margin_percentage",
                "must be at least 0 and below 100",
            ));
        }
        Ok(())
    }

    /// Price a single input.
    #[instrument(skip(self, input), fields(regime = %input.tax_regime, year = self.table.year))]
    pub fn calculate(&self, input: &PricingInput) -> Result<PricingResult> {
        if let Err(err) = Self::validate(input) {
            warn!(error = %err, "rejected pricing input");
            return Err(err);
        }
        let income = input.desired_monthly_income;
        let hours_per_day = Decimal::from(input.hours_per_day);
        let days_per_week = Decimal::from(input.days_per_week);

        let working_weeks_per_year = WEEKS_PER_YEAR - input.vacation_weeks;
        let working_days_per_year = Decimal::from(input.days_per_week * working_weeks_per_year);
        let working_days_per_month = working_days_per_year / MONTHS_PER_YEAR;
        let working_hours_per_month = hours_per_day * working_days_per_month;

        let monthly_taxes = self.table.monthly_taxes(income, input.tax_regime)?;

        let mut monthly_provisions = Decimal::ZERO;
        if input.include_13th {
            monthly_provisions += income / MONTHS_PER_YEAR;
        }
        if input.include_vacation {
            monthly_provisions += income / dec!(3) / MONTHS_PER_YEAR;
        }

        let total_monthly_costs = income
            .checked_add(monthly_taxes)
            .and_then(|total| total.checked_add(monthly_provisions))
            .ok_or_else(|| overflow("desired_monthly_income"))?
            .checked_add(input.monthly_expenses)
            .ok_or_else(|| overflow("monthly_expenses"))?
            .checked_add(input.variable_expenses)
            .ok_or_else(|| overflow("variable_expenses"))?;
        let total_annual_costs = total_monthly_costs
            .checked_mul(MONTHS_PER_YEAR)
            .ok_or_else(|| overflow("desired_monthly_income"))?;

        // margin < 100 leaves a positive divisor, but one close enough to
        // zero can still push the rate past what a Decimal holds
        let margin = input.profit_margin_percentage / Decimal::ONE_HUNDRED;
        let monthly_rate = total_monthly_costs
            .checked_div(Decimal::ONE - margin)
            .ok_or_else(|| overflow("profit_margin_percentage"))?;

        let hourly_rate = monthly_rate
            .checked_div(working_hours_per_month)
            .ok_or_else(|| overflow("desired_monthly_income"))?;
        let scale = |hours: Decimal| {
            hourly_rate
                .checked_mul(hours)
                .ok_or_else(|| overflow("desired_monthly_income"))
        };
        let daily_rate = scale(hours_per_day)?;
        let weekly_rate = daily_rate
            .checked_mul(days_per_week)
            .ok_or_else(|| overflow("desired_monthly_income"))?;

        let result = PricingResult {
            hourly_rate,
            daily_rate,
            weekly_rate,
            monthly_rate,
            total_monthly_costs,
            total_annual_costs,
            monthly_taxes,
            monthly_provisions,
            net_monthly_income: income,
            working_hours_per_month: round_to_count("hours_per_day", working_hours_per_month)?,
            working_days_per_month: round_to_count("days_per_week", working_days_per_month)?,
            tax_regime: input.tax_regime,
            tax_year: self.table.year,
            projects: ProjectSuggestions {
                small: scale(SMALL_PROJECT_HOURS)?,
                medium: scale(MEDIUM_PROJECT_HOURS)?,
                large: scale(LARGE_PROJECT_HOURS)?,
            },
        };
        debug!(
            hourly_rate = %result.hourly_rate,
            monthly_rate = %result.monthly_rate,
            monthly_taxes = %result.monthly_taxes,
            "priced input"
        );
        Ok(result)
    }

    /// Price many inputs in parallel.  Results keep the order of `inputs`
    /// and each carries its own error.
    pub fn calculate_batch(&self, inputs: &[PricingInput]) -> Vec<Result<PricingResult>> {
        inputs.par_iter().map(|input| self.calculate(input)).collect()
    }

    /// Price `base` under every tax regime, in [`TaxRegime::ALL`] order.
    pub fn compare_regimes(&self, base: &PricingInput) -> Result<Vec<RegimeComparison>> {
        Self::validate(base)?;
        TaxRegime::ALL
            .par_iter()
            .map(|&regime| {
                let result = self.calculate(&base.with_regime(regime))?;
                Ok(RegimeComparison {
                    regime,
                    info: self.regime_info(regime),
                    monthly_taxes: result.monthly_taxes,
                    hourly_rate: result.hourly_rate,
                    total_monthly_costs: result.total_monthly_costs,
                })
            })
            .collect()
    }
}

fn overflow(field: &'static str) -> PricingError {
    PricingError::invalid(field, "too large to price")
}

/// Nearest whole number, halves rounded away from zero.
fn round_to_count(field: &'static str, value: Decimal) -> Result<u32> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .ok_or_else(|| overflow(field))
}
