//! The pluggable replacement policy enumeration.
//!
//! Modeled as a tagged enum dispatched on by [`crate::control::StrategyControl`]
//! rather than a trait-per-policy hierarchy: the queue state is shared
//! across all four policies and only the selection walk varies.

use crate::error::StrategyError;

/// The replacement policy selected for a pool at startup.
///
/// The process-wide default is [`ReplacementPolicy::TwoQ`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementPolicy {
    Clock,
    Lru,
    Mru,
    TwoQ,
}

impl Default for ReplacementPolicy {
    fn default() -> Self {
        ReplacementPolicy::TwoQ
    }
}

/// Returns the stable, lowercase name used in configuration and diagnostics.
pub fn policy_name(policy: ReplacementPolicy) -> &'static str {
    match policy {
        ReplacementPolicy::Clock => "clock",
        ReplacementPolicy::Lru => "lru",
        ReplacementPolicy::Mru => "mru",
        ReplacementPolicy::TwoQ => "2q",
    }
}

impl TryFrom<i64> for ReplacementPolicy {
    type Error = StrategyError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ReplacementPolicy::Clock),
            1 => Ok(ReplacementPolicy::Lru),
            2 => Ok(ReplacementPolicy::Mru),
            3 => Ok(ReplacementPolicy::TwoQ),
            other => Err(StrategyError::InvalidPolicy(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_documented_configuration_strings() {
        assert_eq!(policy_name(ReplacementPolicy::Clock), "clock");
        assert_eq!(policy_name(ReplacementPolicy::Lru), "lru");
        assert_eq!(policy_name(ReplacementPolicy::Mru), "mru");
        assert_eq!(policy_name(ReplacementPolicy::TwoQ), "2q");
    }

    #[test]
    fn default_policy_is_two_q() {
        assert_eq!(ReplacementPolicy::default(), ReplacementPolicy::TwoQ);
    }

    #[test]
    fn unknown_discriminant_is_rejected() {
        let err = ReplacementPolicy::try_from(42).unwrap_err();
        assert_eq!(err.to_string(), "invalid buffer pool replacement policy 42");
    }
}
