//! Duration Parser Module
//!
//! Turns human-friendly duration expressions (`30`, `"90s"`, `"5m"`, `"2h"`,
//! `"1d"`, `"no-store"`, `"force-cache"`) into a [`Ttl`].
//!
//! # Leniency
//! - Surrounding whitespace is ignored and a bare integer means seconds.
//! - A numeric prefix followed by an unknown unit is read as seconds of that
//!   prefix (`"10x"` is ten seconds). This is logged at `warn` level.
//! - Empty, negative or non-numeric input is rejected with
//!   [`CacheError::InvalidDuration`], as is a value that overflows `u64` seconds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::{CacheError, Result};

/// Sentinel meaning "do not keep past immediate use" (zero seconds).
pub const NO_STORE: &str = "no-store";

/// Sentinel meaning "never expires".
pub const FORCE_CACHE: &str = "force-cache";

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

// == Ttl ==
/// A parsed cache duration.
///
/// `Forever` is kept apart from any finite value so that "cache forever" is
/// stored as an absent expiry instead of a huge timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ttl {
    /// Expires this many seconds after being written
    Seconds(u64),
    /// Never expires on its own
    Forever,
}

impl Ttl {
    /// Returns the finite number of seconds, or `None` for [`Ttl::Forever`].
    pub fn as_secs(&self) -> Option<u64> {
        match self {
            Ttl::Seconds(secs) => Some(*secs),
            Ttl::Forever => None,
        }
    }

    /// Absolute expiry in unix milliseconds for an entry written at `now_ms`.
    pub fn expires_at(&self, now_ms: u64) -> Option<u64> {
        self.as_secs()
            .map(|secs| now_ms.saturating_add(secs.saturating_mul(1000)))
    }
}

impl Default for Ttl {
    /// Five minutes.
    fn default() -> Self {
        Ttl::Seconds(5 * SECS_PER_MINUTE)
    }
}

impl From<u64> for Ttl {
    fn from(secs: u64) -> Self {
        Ttl::Seconds(secs)
    }
}

impl FromStr for Ttl {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        parse_duration(s)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Seconds(secs) => write!(f, "{}s", secs),
            Ttl::Forever => f.write_str(FORCE_CACHE),
        }
    }
}

impl Serialize for Ttl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ttl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawDuration {
            Seconds(u64),
            Expr(String),
        }

        match RawDuration::deserialize(deserializer)? {
            RawDuration::Seconds(secs) => Ok(Ttl::Seconds(secs)),
            RawDuration::Expr(expr) => parse_duration(&expr).map_err(serde::de::Error::custom),
        }
    }
}

// == Parse ==
/// Parses a duration expression.
///
/// # Examples
/// ```
/// use storefront_cache::cache::{parse_duration, Ttl};
///
/// assert_eq!(parse_duration("5m").unwrap(), Ttl::Seconds(300));
/// assert_eq!(parse_duration("no-store").unwrap(), Ttl::Seconds(0));
/// assert_eq!(parse_duration("force-cache").unwrap(), Ttl::Forever);
/// ```
pub fn parse_duration(input: &str) -> Result<Ttl> {
    let expr = input.trim();

    match expr {
        NO_STORE => return Ok(Ttl::Seconds(0)),
        FORCE_CACHE => return Ok(Ttl::Forever),
        _ => {}
    }

    let digits_end = expr
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(expr.len());
    if digits_end == 0 {
        return Err(CacheError::InvalidDuration(format!(
            "'{}' does not start with a non-negative integer",
            input
        )));
    }

    let (number, unit) = expr.split_at(digits_end);
    let value: u64 = number
        .parse()
        .map_err(|_| CacheError::InvalidDuration(format!("'{}' is out of range", input)))?;

    let multiplier = match unit {
        "" | "s" => 1,
        "m" => SECS_PER_MINUTE,
        "h" => SECS_PER_HOUR,
        "d" => SECS_PER_DAY,
        other => {
            warn!(
                "Unknown duration unit '{}' in '{}', reading {} as seconds",
                other, input, value
            );
            1
        }
    };

    value
        .checked_mul(multiplier)
        .map(Ttl::Seconds)
        .ok_or_else(|| CacheError::InvalidDuration(format!("'{}' is out of range", input)))
}
