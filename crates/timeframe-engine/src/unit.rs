//! Unit table for timeframe literals.
//!
//! Lowercase `m` is minutes and uppercase `M` is months. Days, weeks and years
//! accept either case. Months and years are fixed approximations (30 and 365
//! days) and therefore drift from calendar boundaries.

use std::fmt;

/// A period unit recognized in timeframe literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    /// 30 days.
    Month,
    /// 365 days.
    Year,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 7] = [
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
        TimeUnit::Day,
        TimeUnit::Week,
        TimeUnit::Month,
        TimeUnit::Year,
    ];

    /// Look up the unit for a literal suffix. Case-sensitive.
    pub fn from_symbol(symbol: char) -> Option<TimeUnit> {
        match symbol {
            's' => Some(TimeUnit::Second),
            'm' => Some(TimeUnit::Minute),
            'h' => Some(TimeUnit::Hour),
            'd' | 'D' => Some(TimeUnit::Day),
            'w' | 'W' => Some(TimeUnit::Week),
            'M' => Some(TimeUnit::Month),
            'y' | 'Y' => Some(TimeUnit::Year),
            _ => None,
        }
    }

    /// Canonical suffix used when rendering a literal for this unit.
    pub fn symbol(self) -> char {
        match self {
            TimeUnit::Second => 's',
            TimeUnit::Minute => 'm',
            TimeUnit::Hour => 'h',
            TimeUnit::Day => 'D',
            TimeUnit::Week => 'W',
            TimeUnit::Month => 'M',
            TimeUnit::Year => 'Y',
        }
    }

    pub fn seconds(self) -> i64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3_600,
            TimeUnit::Day => 86_400,
            TimeUnit::Week => 604_800,
            TimeUnit::Month => 2_592_000,
            TimeUnit::Year => 31_536_000,
        }
    }

    pub fn milliseconds(self) -> i64 {
        self.seconds() * 1_000
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Year => "year",
        };
        f.write_str(name)
    }
}
