/// Convenience result type used across Flipbook.
pub type FlipbookResult<T> = Result<T, FlipbookError>;

/// Top-level error taxonomy for structural and editing APIs.
///
/// Script faults are deliberately not part of this enum: a user-script error
/// is a runtime outcome returned by `tick`, not an API failure. See
/// [`crate::ScriptError`].
#[derive(thiserror::Error, Debug)]
pub enum FlipbookError {
    /// Invalid user-provided data (bad spans, overlaps, duplicate names).
    #[error("validation error: {0}")]
    Validation(String),

    /// Inconsistent scene structure (unknown ids, illegal placements).
    #[error("scene error: {0}")]
    Scene(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlipbookError {
    /// Build a [`FlipbookError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlipbookError::Scene`] value.
    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene(msg.into())
    }
}
