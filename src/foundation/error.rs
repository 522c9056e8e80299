/// Convenience result type used across mathreel.
pub type MathreelResult<T> = Result<T, MathreelError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Numeric edge cases in plotted functions, progress overshoot, duplicate registration and
/// removal of entities that are not registered are not errors; they are absorbed where they
/// happen.
#[derive(thiserror::Error, Debug)]
pub enum MathreelError {
    /// Invalid user-provided configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors from the text shaper or the formula typesetter.
    #[error("layout error: {0}")]
    Layout(String),

    /// Errors while rasterizing or encoding frames.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MathreelError {
    /// Build a [`MathreelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MathreelError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`MathreelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`MathreelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
