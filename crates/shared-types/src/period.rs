//! Reporting periods (a month or a quarter of a year).

use crate::errors::DomainError;
use crate::status::Variant;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Earliest and latest year accepted for a reporting period.
pub const MIN_YEAR: i32 = 1990;
pub const MAX_YEAR: i32 = 2100;

/// Month (1-12) or quarter (1-4) within the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodUnit {
    Month(u8),
    Quarter(u8),
}

/// A validated reporting period.
///
/// Serialised as its display form (`2024-03`, `2024-Q1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportingPeriod {
    year: i32,
    unit: PeriodUnit,
}

impl ReportingPeriod {
    pub fn month(year: i32, month: u8) -> Result<Self, DomainError> {
        check_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(DomainError::InvalidMonth(month));
        }
        Ok(Self {
            year,
            unit: PeriodUnit::Month(month),
        })
    }

    pub fn quarter(year: i32, quarter: u8) -> Result<Self, DomainError> {
        check_year(year)?;
        if !(1..=4).contains(&quarter) {
            return Err(DomainError::InvalidQuarter(quarter));
        }
        Ok(Self {
            year,
            unit: PeriodUnit::Quarter(quarter),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn unit(&self) -> PeriodUnit {
        self.unit
    }

    /// Month or quarter number.
    pub fn ordinal(&self) -> u8 {
        match self.unit {
            PeriodUnit::Month(m) => m,
            PeriodUnit::Quarter(q) => q,
        }
    }

    /// The filing variant this period belongs to.
    pub fn variant(&self) -> Variant {
        match self.unit {
            PeriodUnit::Month(_) => Variant::Monthly,
            PeriodUnit::Quarter(_) => Variant::Quarterly,
        }
    }

    /// Version/period token `{year}{MM}01`.
    pub fn token(&self) -> String {
        format!("{:04}{:02}01", self.year, self.ordinal())
    }

    /// First day of the period.
    pub fn start_date(&self) -> Option<NaiveDate> {
        let month = match self.unit {
            PeriodUnit::Month(m) => m,
            PeriodUnit::Quarter(q) => (q - 1) * 3 + 1,
        };
        NaiveDate::from_ymd_opt(self.year, u32::from(month), 1)
    }
}

fn check_year(year: i32) -> Result<(), DomainError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(DomainError::InvalidYear(year))
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            PeriodUnit::Month(m) => write!(f, "{:04}-{:02}", self.year, m),
            PeriodUnit::Quarter(q) => write!(f, "{:04}-Q{}", self.year, q),
        }
    }
}

impl FromStr for ReportingPeriod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DomainError::MalformedPeriod(s.to_string());
        let (year, rest) = s.trim().split_once('-').ok_or_else(malformed)?;
        let year: i32 = year.parse().map_err(|_| malformed())?;
        if let Some(q) = rest.strip_prefix('Q') {
            let quarter: u8 = q.parse().map_err(|_| malformed())?;
            Self::quarter(year, quarter)
        } else {
            let month: u8 = rest.parse().map_err(|_| malformed())?;
            Self::month(year, month)
        }
    }
}

impl TryFrom<String> for ReportingPeriod {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReportingPeriod> for String {
    fn from(period: ReportingPeriod) -> Self {
        period.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_zero_pads_ordinal() {
        assert_eq!(ReportingPeriod::month(2024, 3).unwrap().token(), "20240301");
        assert_eq!(ReportingPeriod::month(2024, 11).unwrap().token(), "20241101");
        assert_eq!(ReportingPeriod::quarter(2024, 2).unwrap().token(), "20240201");
    }

    #[test]
    fn test_bounds() {
        assert_eq!(
            ReportingPeriod::month(2024, 13),
            Err(DomainError::InvalidMonth(13))
        );
        assert_eq!(
            ReportingPeriod::quarter(2024, 0),
            Err(DomainError::InvalidQuarter(0))
        );
        assert_eq!(
            ReportingPeriod::month(1800, 1),
            Err(DomainError::InvalidYear(1800))
        );
    }

    #[test]
    fn test_display_parses_back() {
        for period in [
            ReportingPeriod::month(2024, 1).unwrap(),
            ReportingPeriod::quarter(2023, 4).unwrap(),
        ] {
            assert_eq!(period.to_string().parse::<ReportingPeriod>().unwrap(), period);
        }
        assert_eq!(ReportingPeriod::quarter(2023, 4).unwrap().to_string(), "2023-Q4");
        assert!("2024/03".parse::<ReportingPeriod>().is_err());
    }

    #[test]
    fn test_quarter_start_date() {
        let q3 = ReportingPeriod::quarter(2024, 3).unwrap();
        assert_eq!(q3.start_date(), NaiveDate::from_ymd_opt(2024, 7, 1));
        assert_eq!(q3.variant(), Variant::Quarterly);
    }
}
