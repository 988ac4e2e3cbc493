/// Convenience result type used across overmark.
pub type OvermarkResult<T> = Result<T, OvermarkError>;

/// Top-level error taxonomy used by the model, render and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum OvermarkError {
    /// An annotation or document value failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A region or coordinate could not be mapped (degenerate region, non-finite values).
    #[error("geometry error: {0}")]
    Geometry(String),

    /// The page collaborator could not produce a page, or a surface could not be rasterized.
    #[error("rasterization error: {0}")]
    Rasterization(String),

    /// A requested font could not be resolved or loaded.
    #[error("font unavailable: {0}")]
    FontUnavailable(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// The caller cancelled a long-running job.
    #[error("export cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OvermarkError {
    /// Build a [`OvermarkError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`OvermarkError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`OvermarkError::Rasterization`] value.
    pub fn rasterization(msg: impl Into<String>) -> Self {
        Self::Rasterization(msg.into())
    }

    /// Build a [`OvermarkError::FontUnavailable`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::FontUnavailable(msg.into())
    }

    /// Build a [`OvermarkError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True for failures the render and export loops skip over instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Geometry(_) | Self::Rasterization(_) | Self::FontUnavailable(_)
        )
    }
}

impl From<serde_json::Error> for OvermarkError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
