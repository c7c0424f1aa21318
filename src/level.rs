//! Severity levels and their total order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::Error;

/// One of the eight supported severities, from least to most important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Detailed debug information.
    #[default]
    Debug,
    /// Interesting events.
    Info,
    /// Normal but significant events.
    Notice,
    /// Exceptional occurrences that are not errors.
    Warning,
    /// Runtime errors that do not require immediate action.
    Error,
    /// Critical conditions.
    Critical,
    /// Action must be taken immediately.
    Alert,
    /// System is unusable.
    Emergency,
}

impl Level {
    /// Every level, ordered by rank.
    pub const ALL: [Level; 8] = [
        Level::Debug,
        Level::Info,
        Level::Notice,
        Level::Warning,
        Level::Error,
        Level::Critical,
        Level::Alert,
        Level::Emergency,
    ];

    /// Fixed numeric rank used for filtering.
    pub const fn rank(self) -> u8 {
        match self {
            Level::Debug => 10,
            Level::Info => 20,
            Level::Notice => 30,
            Level::Warning => 40,
            Level::Error => 50,
            Level::Critical => 60,
            Level::Alert => 70,
            Level::Emergency => 80,
        }
    }

    /// Lowercase name, as accepted by [`Level::from_str`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Notice => "notice",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
            Level::Alert => "alert",
            Level::Emergency => "emergency",
        }
    }

    /// Uppercase name, as written to log lines.
    pub const fn as_upper(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Notice => "NOTICE",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
            Level::Alert => "ALERT",
            Level::Emergency => "EMERGENCY",
        }
    }

    /// Whether a record at this level passes the given threshold.
    pub const fn should_emit(self, threshold: Level) -> bool {
        self.rank() >= threshold.rank()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidLevel(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warning,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_strictly_increase() {
        let ranks: Vec<u8> = Level::ALL.iter().map(|l| l.rank()).collect();
        assert_eq!(ranks, vec![10, 20, 30, 40, 50, 60, 70, 80]);
        for pair in Level::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_should_emit_matches_rank() {
        for candidate in Level::ALL {
            for threshold in Level::ALL {
                assert_eq!(
                    candidate.should_emit(threshold),
                    candidate.rank() >= threshold.rank()
                );
            }
        }
        assert!(Level::Error.should_emit(Level::Warning));
        assert!(Level::Warning.should_emit(Level::Warning));
        assert!(!Level::Notice.should_emit(Level::Warning));
    }

    #[test]
    fn test_parse_level_names() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("WARNING".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("Emergency".parse::<Level>().unwrap(), Level::Emergency);
        for level in Level::ALL {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }
    }

    #[test]
    fn test_parse_unknown_level() {
        let err = "wrong".parse::<Level>().unwrap_err();
        assert!(matches!(err, Error::InvalidLevel(ref name) if name == "wrong"));
        assert!("warn".parse::<Level>().is_err());
        assert!("".parse::<Level>().is_err());
    }

    #[test]
    fn test_upper_names() {
        assert_eq!(Level::Debug.as_upper(), "DEBUG");
        assert_eq!(Level::Critical.as_upper(), "CRITICAL");
        assert_eq!(Level::Notice.to_string(), "notice");
    }

    #[test]
    fn test_deserialize_level() {
        let level: Level = serde_yaml::from_str("alert").unwrap();
        assert_eq!(level, Level::Alert);
        assert!(serde_yaml::from_str::<Level>("verbose").is_err());
    }

    #[test]
    fn test_from_tracing_level() {
        assert_eq!(Level::from(tracing::Level::TRACE), Level::Debug);
        assert_eq!(Level::from(tracing::Level::INFO), Level::Info);
        assert_eq!(Level::from(tracing::Level::WARN), Level::Warning);
        assert_eq!(Level::from(tracing::Level::ERROR), Level::Error);
    }
}
