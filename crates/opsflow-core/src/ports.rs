//! Port-range strings
//!
//! Accepted forms: `"80"` (one port), `"8080-8099"` (inclusive range) and
//! `"*"` (all ports).

use crate::error::{CoreError, Result};

/// An inclusive TCP/UDP port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub from: u16,
    pub to: u16,
}

impl PortRange {
    /// The all-ports range `0-65535`.
    pub const FULL: PortRange = PortRange { from: 0, to: 65535 };

    pub fn parse(raw: &str) -> Result<PortRange> {
        let raw = raw.trim();
        if raw == "*" {
            return Ok(Self::FULL);
        }
        if let Ok(port) = raw.parse::<u16>() {
            return Ok(PortRange {
                from: port,
                to: port,
            });
        }
        if let Some((from, to)) = raw.split_once('-') {
            if let (Ok(from), Ok(to)) = (from.parse::<u16>(), to.parse::<u16>()) {
                if from > to {
                    return Err(CoreError::ReversedPortRange(raw.to_string()));
                }
                return Ok(PortRange { from, to });
            }
        }
        Err(CoreError::BadPortRange(raw.to_string()))
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }
}

impl std::fmt::Display for PortRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}-{}", self.from, self.to)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_three_accepted_forms() {
        assert_eq!(
            PortRange::parse("80").unwrap(),
            PortRange { from: 80, to: 80 }
        );
        assert_eq!(
            PortRange::parse("8080-8099").unwrap(),
            PortRange {
                from: 8080,
                to: 8099
            }
        );
        assert!(PortRange::parse("*").unwrap().is_full());
    }

    #[test]
    fn reversed_ranges_are_rejected() {
        let err = PortRange::parse("9000-80").unwrap_err();
        assert!(err.to_string().contains("wrong order"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(PortRange::parse("http").is_err());
        assert!(PortRange::parse("80-").is_err());
        assert!(PortRange::parse("70000").is_err());
    }
}
