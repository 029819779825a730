use crate::utils::error::{ContractError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static STATUS_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-5][0-9]{2}$").expect("status code pattern is valid"));

/// Inclusive interval of HTTP status codes.
///
/// Reversed intervals such as `299-200` are accepted as written. They match
/// no status, but still intersect any range spanning both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusRange {
    pub lower: i64,
    pub upper: i64,
}

impl StatusRange {
    /// `*`: every status from 0 upwards.
    pub const WILDCARD: StatusRange = StatusRange {
        lower: 0,
        upper: i64::MAX,
    };

    pub fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }

    pub fn is_wildcard(&self) -> bool {
        *self == Self::WILDCARD
    }

    #[inline]
    pub fn contains(&self, status: i64) -> bool {
        status >= self.lower && status <= self.upper
    }

    #[inline]
    pub fn intersects(&self, other: &StatusRange) -> bool {
        self.upper >= other.lower && self.lower <= other.upper
    }
}

impl fmt::Display for StatusRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wildcard() {
            write!(f, "*")
        } else if self.lower == self.upper {
            write!(f, "{}", self.lower)
        } else {
            write!(f, "{}-{}", self.lower, self.upper)
        }
    }
}

impl FromStr for StatusRange {
    type Err = ContractError;

    fn from_str(segment: &str) -> Result<Self> {
        if segment == "*" {
            return Ok(Self::WILDCARD);
        }

        let parts: Vec<&str> = segment.split('-').collect();
        if parts.len() > 2 {
            return Err(ContractError::InvalidStatusExpression {
                status: segment.to_string(),
            });
        }

        let lower = parts[0];
        let upper = parts.get(1).copied().unwrap_or(lower);

        Ok(Self {
            lower: parse_code(lower)?,
            upper: parse_code(upper)?,
        })
    }
}

fn parse_code(code: &str) -> Result<i64> {
    STATUS_CODE
        .is_match(code)
        .then(|| code.parse().ok())
        .flatten()
        .ok_or_else(|| ContractError::InvalidStatusCode {
            code: code.to_string(),
        })
}

/// Parses a comma separated status expression such as `"200-299,404"` or `"*"`.
pub fn parse_status_expression(expr: &str) -> Result<Vec<StatusRange>> {
    let ranges = expr
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(StatusRange::from_str)
        .collect::<Result<Vec<_>>>()?;

    if ranges.is_empty() {
        return Err(ContractError::InvalidStatusExpression {
            status: expr.to_string(),
        });
    }

    Ok(ranges)
}
