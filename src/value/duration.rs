//! Calendar-style durations with a human readable canonical form.
//!
//! A duration is an amount of a single unit (`7 hours`, `1 day`). The canonical
//! string is `"<amount> <unit>"` with the unit in singular form when the amount is
//! one and plural otherwise; parsing accepts both forms.

use std::fmt;
use std::str::FromStr;

/// Unit of a [`Duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DurationUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl DurationUnit {
    pub fn singular(&self) -> &'static str {
        match self {
            DurationUnit::Milliseconds => "millisecond",
            DurationUnit::Seconds => "second",
            DurationUnit::Minutes => "minute",
            DurationUnit::Hours => "hour",
            DurationUnit::Days => "day",
            DurationUnit::Weeks => "week",
            DurationUnit::Months => "month",
            DurationUnit::Years => "year",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            DurationUnit::Milliseconds => "milliseconds",
            DurationUnit::Seconds => "seconds",
            DurationUnit::Minutes => "minutes",
            DurationUnit::Hours => "hours",
            DurationUnit::Days => "days",
            DurationUnit::Weeks => "weeks",
            DurationUnit::Months => "months",
            DurationUnit::Years => "years",
        }
    }

    const ALL: [DurationUnit; 8] = [
        DurationUnit::Milliseconds,
        DurationUnit::Seconds,
        DurationUnit::Minutes,
        DurationUnit::Hours,
        DurationUnit::Days,
        DurationUnit::Weeks,
        DurationUnit::Months,
        DurationUnit::Years,
    ];

    /// Looks a unit up by its singular or plural name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|unit| unit.singular() == name || unit.plural() == name)
    }
}

/// An amount of a single [`DurationUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Duration {
    pub amount: i64,
    pub unit: DurationUnit,
}

impl Duration {
    pub fn new(amount: i64, unit: DurationUnit) -> Self {
        Self { amount, unit }
    }

    pub fn seconds(amount: i64) -> Self {
        Self::new(amount, DurationUnit::Seconds)
    }

    pub fn minutes(amount: i64) -> Self {
        Self::new(amount, DurationUnit::Minutes)
    }

    pub fn hours(amount: i64) -> Self {
        Self::new(amount, DurationUnit::Hours)
    }

    pub fn days(amount: i64) -> Self {
        Self::new(amount, DurationUnit::Days)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = if self.amount.unsigned_abs() == 1 {
            self.unit.singular()
        } else {
            self.unit.plural()
        };
        write!(f, "{} {}", self.amount, unit)
    }
}

/// Errors raised while parsing a duration string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationParseError {
    #[error("Malformed duration '{0}': expected '<amount> <unit>'")]
    Malformed(String),
    #[error("Invalid duration amount '{0}'")]
    InvalidAmount(String),
    #[error("Unknown duration unit '{0}'")]
    UnknownUnit(String),
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (amount, unit) = match (parts.next(), parts.next(), parts.next()) {
            (Some(amount), Some(unit), None) => (amount, unit),
            _ => return Err(DurationParseError::Malformed(s.to_string())),
        };
        let amount = amount
            .parse::<i64>()
            .map_err(|_| DurationParseError::InvalidAmount(amount.to_string()))?;
        let unit = DurationUnit::from_name(unit)
            .ok_or_else(|| DurationParseError::UnknownUnit(unit.to_string()))?;
        Ok(Self::new(amount, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_plural_and_singular_units() {
        assert_eq!(Duration::hours(7).to_string(), "7 hours");
        assert_eq!(Duration::days(1).to_string(), "1 day");
        assert_eq!(Duration::minutes(-1).to_string(), "-1 minute");
    }

    #[test]
    fn extreme_amounts_display() {
        assert_eq!(Duration::hours(i64::MIN).to_string(), format!("{} hours", i64::MIN));
        let text = Duration::days(i64::MAX).to_string();
        assert_eq!(text.parse::<Duration>().unwrap(), Duration::days(i64::MAX));
    }

    #[test]
    fn parses_both_unit_forms() {
        assert_eq!("7 hours".parse::<Duration>().unwrap(), Duration::hours(7));
        assert_eq!("1 hour".parse::<Duration>().unwrap(), Duration::hours(1));
        assert_eq!(
            "250 milliseconds".parse::<Duration>().unwrap(),
            Duration::new(250, DurationUnit::Milliseconds)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            "seven hours".parse::<Duration>(),
            Err(DurationParseError::InvalidAmount(_))
        ));
        assert!(matches!(
            "7 fortnights".parse::<Duration>(),
            Err(DurationParseError::UnknownUnit(_))
        ));
        assert!(matches!(
            "7".parse::<Duration>(),
            Err(DurationParseError::Malformed(_))
        ));
    }
}
