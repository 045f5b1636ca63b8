//! The only errors that are allowed to cross the public API boundary.
//!
//! Everything else in the crate — transport failures, decode failures, filter/id-extractor
//! panics-turned-results, geometry anomalies, merge failures — is handled locally per the error
//! taxonomy and never becomes a [`CoreError`]. This type exists purely for programmer mistakes
//! that the caller should fix, not for conditions a well-behaved host needs to recover from at
//! runtime.

use thiserror::Error;

/// Programmer-error conditions that [`crate::Source`] surfaces instead of handling locally.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// A public method was called after [`crate::Source::dispose`].
    #[error("method called on a disposed source")]
    Disposed,

    /// The source was constructed with a configuration that can never produce a valid tile URL.
    #[error("invalid source configuration: {0}")]
    InvalidConfiguration(String),
}
