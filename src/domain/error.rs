//! Domain validation errors.
//!
//! Returned by `parse`/`try_new` constructors when an input violates a
//! domain invariant.
//!
//! # Examples
//!
//! ```
//! use remoting_ctl::domain::error::DomainError;
//! use remoting_ctl::domain::HostPort;
//!
//! let result = HostPort::parse("80");
//! assert!(matches!(result, Err(DomainError::PortOutOfRange { value: 80 })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The port text is not an integer.
    #[error("port must be an integer, got {input:?}")]
    InvalidPort {
        /// The rejected input.
        input: String,
    },

    /// Host ports must be unprivileged and fit in 16 bits.
    #[error("port must be between 1025 and 65535, got {value}")]
    PortOutOfRange {
        /// The rejected value.
        value: i64,
    },
}
