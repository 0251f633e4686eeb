use thiserror::Error;

/// A specialized `Result` type for platform backend operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// The error type for all OS-level capture and input operations.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("No display found to capture from")]
    NoDisplay,

    #[error("Failed to enumerate displays: {description}")]
    DisplayEnumerationFailed { description: String },

    #[error("Screen capture failed: {description}")]
    CaptureFailed { description: String },

    #[error("Input backend could not be initialized: {description}")]
    InputInitFailed { description: String },

    #[error("Moving the pointer to ({x}, {y}) failed: {description}")]
    PointerMoveFailed { x: i32, y: i32, description: String },

    #[error("Mouse click failed: {description}")]
    ClickFailed { description: String },
}

impl PlatformError {
    /// Capture errors are transient: the next cycle may succeed
    pub fn is_capture_failure(&self) -> bool {
        matches!(
            self,
            PlatformError::CaptureFailed { .. } | PlatformError::NoDisplay
        )
    }

    /// Input errors never stop the loop; detection reconciles them later
    pub fn is_input_failure(&self) -> bool {
        matches!(
            self,
            PlatformError::InputInitFailed { .. }
                | PlatformError::PointerMoveFailed { .. }
                | PlatformError::ClickFailed { .. }
        )
    }
}
