//! Figures shown on the property dashboard.
//!
//! All amounts are in cents.

use chrono::Datelike;

use crate::api::types::{Stay, StaySource};

/// Co-host share of a direct booking, in percent.
const INTERNAL_COHOST_PERCENT: i64 = 10;
/// Co-host share of a booking from an external platform, in percent.
const EXTERNAL_COHOST_PERCENT: i64 = 12;

/// Headline numbers for a set of stays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyNumbers {
    pub stays: usize,
    pub total_price: i64,
    pub average_price: i64,
}

impl PropertyNumbers {
    pub fn from_stays(stays: &[Stay]) -> Self {
        let total_price: i64 = stays.iter().map(|s| s.price).sum();
        let average_price = if stays.is_empty() {
            0
        } else {
            total_price / stays.len() as i64
        };
        Self {
            stays: stays.len(),
            total_price,
            average_price,
        }
    }
}

/// One month of income.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyIncome {
    /// 1 through 12.
    pub month: u32,
    pub income: i64,
    pub stays: usize,
}

/// One month of co-host payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyCohost {
    pub month: u32,
    pub cohost_payment: i64,
    pub stays: usize,
}

/// Income per check-in month for stays starting in `year`.
///
/// Always returns 12 entries, January first.
pub fn income_per_month(stays: &[Stay], year: i32) -> Vec<MonthlyIncome> {
    (1..=12)
        .map(|month| {
            let in_month = stays
                .iter()
                .filter(|s| s.check_in.year() == year && s.check_in.month() == month);
            let (income, count) = in_month.fold((0, 0), |(sum, n), s| (sum + s.price, n + 1));
            MonthlyIncome {
                month,
                income,
                stays: count,
            }
        })
        .collect()
}

/// The co-host's share of a stay's price, truncated to whole cents.
pub fn cohost_payment(stay: &Stay) -> i64 {
    let percent = match stay.source {
        StaySource::Internal => INTERNAL_COHOST_PERCENT,
        _ => EXTERNAL_COHOST_PERCENT,
    };
    stay.price * percent / 100
}

/// Co-host payments per check-in month across all years.
pub fn cohost_per_month(stays: &[Stay]) -> Vec<MonthlyCohost> {
    (1..=12)
        .map(|month| {
            let in_month: Vec<&Stay> = stays
                .iter()
                .filter(|s| s.check_in.month() == month)
                .collect();
            MonthlyCohost {
                month,
                cohost_payment: in_month.iter().map(|s| cohost_payment(s)).sum(),
                stays: in_month.len(),
            }
        })
        .collect()
}

/// Distinct check-in years, newest first.
pub fn available_years(stays: &[Stay]) -> Vec<i32> {
    let mut years: Vec<i32> = stays.iter().map(|s| s.check_in.year()).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}
