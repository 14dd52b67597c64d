//! Prometheus-style durations (`10s`, `1m30s`, `2h`, `500ms`).
//!
//! Scrape intervals and timeouts are written in the same grammar the
//! Prometheus ecosystem uses, so documents can be shared between tools.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;
const MS_PER_WEEK: u64 = 7 * MS_PER_DAY;
const MS_PER_YEAR: u64 = 365 * MS_PER_DAY;

/// Units in grammar order, paired with their capture group index.
const UNITS: [(usize, u64); 7] = [
    (2, MS_PER_YEAR),
    (4, MS_PER_WEEK),
    (6, MS_PER_DAY),
    (8, MS_PER_HOUR),
    (10, MS_PER_MINUTE),
    (12, MS_PER_SECOND),
    (14, 1),
];

/// Duration parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration string")]
    Empty,

    #[error("not a valid duration string: {0:?}")]
    Invalid(String),

    #[error("duration out of range: {0:?}")]
    Overflow(String),
}

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(([0-9]+)y)?(([0-9]+)w)?(([0-9]+)d)?(([0-9]+)h)?(([0-9]+)m)?(([0-9]+)s)?(([0-9]+)ms)?$",
        )
        .expect("duration regex is valid")
    })
}

/// A millisecond-precision duration with Prometheus text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(std::time::Duration);

impl Duration {
    pub const fn from_secs(secs: u64) -> Self {
        Duration(std::time::Duration::from_secs(secs))
    }

    pub const fn from_millis(ms: u64) -> Self {
        Duration(std::time::Duration::from_millis(ms))
    }

    pub fn as_std(&self) -> std::time::Duration {
        self.0
    }

    pub fn as_millis(&self) -> u64 {
        u64::try_from(self.0.as_millis()).unwrap_or(u64::MAX)
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Duration(d)
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> Self {
        d.0
    }
}

impl FromStr for Duration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => return Err(DurationError::Empty),
            // Allow 0 without a unit.
            "0" => return Ok(Duration::default()),
            _ => {}
        }

        let caps = duration_re()
            .captures(s)
            .ok_or_else(|| DurationError::Invalid(s.to_string()))?;

        let mut total: u64 = 0;
        for (group, mult) in UNITS {
            let Some(m) = caps.get(group) else {
                continue;
            };
            let n: u64 = m
                .as_str()
                .parse()
                .map_err(|_| DurationError::Overflow(s.to_string()))?;
            total = n
                .checked_mul(mult)
                .and_then(|v| total.checked_add(v))
                .ok_or_else(|| DurationError::Overflow(s.to_string()))?;
        }

        Ok(Duration::from_millis(total))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ms = self.as_millis();
        if ms == 0 {
            return write!(f, "0s");
        }

        // Years and weeks only render when they divide exactly.
        let units: [(&str, u64, bool); 7] = [
            ("y", MS_PER_YEAR, true),
            ("w", MS_PER_WEEK, true),
            ("d", MS_PER_DAY, false),
            ("h", MS_PER_HOUR, false),
            ("m", MS_PER_MINUTE, false),
            ("s", MS_PER_SECOND, false),
            ("ms", 1, false),
        ];
        for (unit, mult, exact) in units {
            if exact && ms % mult != 0 {
                continue;
            }
            let v = ms / mult;
            if v > 0 {
                write!(f, "{}{}", v, unit)?;
                ms -= v * mult;
            }
        }
        Ok(())
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_units() {
        assert_eq!("10s".parse::<Duration>().unwrap(), Duration::from_secs(10));
        assert_eq!("500ms".parse::<Duration>().unwrap(), Duration::from_millis(500));
        assert_eq!("2h".parse::<Duration>().unwrap(), Duration::from_secs(7200));
        assert_eq!("1d".parse::<Duration>().unwrap(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_parse_compound() {
        assert_eq!("1m30s".parse::<Duration>().unwrap(), Duration::from_secs(90));
        assert_eq!(
            "1h2m3s4ms".parse::<Duration>().unwrap(),
            Duration::from_millis(3_723_004)
        );
    }

    #[test]
    fn test_parse_zero() {
        assert_eq!("0".parse::<Duration>().unwrap(), Duration::default());
        assert_eq!("0s".parse::<Duration>().unwrap(), Duration::default());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("".parse::<Duration>(), Err(DurationError::Empty));
        assert!(matches!(
            "10".parse::<Duration>(),
            Err(DurationError::Invalid(_))
        ));
        assert!(matches!(
            "1s1m".parse::<Duration>(),
            Err(DurationError::Invalid(_))
        ));
        assert!(matches!(
            "-5s".parse::<Duration>(),
            Err(DurationError::Invalid(_))
        ));
        assert!(matches!(
            "99999999999999999999y".parse::<Duration>(),
            Err(DurationError::Overflow(_))
        ));
    }

    #[test]
    fn test_display_canonical() {
        assert_eq!(Duration::from_secs(10).to_string(), "10s");
        assert_eq!(Duration::from_secs(90).to_string(), "1m30s");
        assert_eq!(Duration::default().to_string(), "0s");
        assert_eq!(Duration::from_secs(14 * 86_400).to_string(), "2w");
        // 8 days is not a whole number of weeks.
        assert_eq!(Duration::from_secs(8 * 86_400).to_string(), "8d");
        assert_eq!(Duration::from_millis(1_500).to_string(), "1s500ms");
    }

    #[test]
    fn test_serde_yaml_string_form() {
        let d: Duration = serde_yaml::from_str("15s").unwrap();
        assert_eq!(d, Duration::from_secs(15));
        let out = serde_yaml::to_string(&d).unwrap();
        assert_eq!(out.trim(), "15s");
    }
}
