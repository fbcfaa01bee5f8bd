//! Error taxonomy shared by every sampler and counter in the crate.

use thiserror::Error;

/// Errors returned by the combinatorial counters and samplers.
///
/// Every error is caller-visible and immediate: no sampler returns a
/// partial object. The only side effect of a failed call is the randomness
/// already drawn from the caller's stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombinatoricsError {
    /// An argument is outside the domain of the operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A fixed-width conversion would have wrapped.
    #[error("numeric overflow: {0}")]
    Overflow(String),
}

impl CombinatoricsError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CombinatoricsError::InvalidArgument(msg.into())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CombinatoricsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = CombinatoricsError::invalid("k=3 exceeds n=2");
        assert_eq!(e.to_string(), "invalid argument: k=3 exceeds n=2");
        let e = CombinatoricsError::Overflow("sum".into());
        assert_eq!(e.to_string(), "numeric overflow: sum");
    }
}
