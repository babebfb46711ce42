//! Dispatch errors.
//!
//! The default call path has no failure modes: out-of-range selectors clamp
//! and behavior results pass through untouched. These errors come from the
//! strict entry points and from validating a domain while building a table.

use thiserror::Error;

/// Errors raised by table construction and strict dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A selector ordinal was `>= END` on a strict call.
    #[error("selector {ordinal} out of range for dimension {dimension} ({domain}, END = {end})")]
    OutOfRange {
        dimension: usize,
        domain: &'static str,
        ordinal: usize,
        end: usize,
    },

    /// A domain's `visit` disagrees with its `END`.
    #[error("malformed selector domain {domain}: {reason}")]
    MalformedDomain {
        domain: &'static str,
        reason: String,
    },
}

/// Dispatch result type.
pub type DispatchResult<T> = Result<T, DispatchError>;
