//! Error types for the designer core
//!
//! Render-cycle entry points catch these and log them; nothing here is
//! allowed to escape to the host.

use thiserror::Error;

/// Malformed XML, with the position roxmltree reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to parse XML at {line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl ParseError {
    pub fn from_xml(error: &roxmltree::Error) -> Self {
        let pos = error.pos();
        Self {
            message: error.to_string(),
            line: pos.row,
            column: pos.col,
        }
    }
}

/// Failures that abort a whole render pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The document does not hold exactly one `Wix/Fragment/UI/Dialog`.
    #[error("The document is not a single-dialog WiX UI fragment.")]
    NotADialogFragment,

    #[error("The dialog node has invalid size attributes.")]
    InvalidDialogSize,

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Configuration loading and assignment errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("The update interval must be a positive value (got {0}).")]
    NonPositiveUpdateInterval(f64),

    #[error("The update interval must be at least one nanosecond and fit a duration (got {0}).")]
    InvalidUpdateInterval(f64),

    #[error("The panel size must be greater than zero and less than one (got {0}).")]
    InvalidPanelSize(f64),

    #[error("Unknown debug context: {0}")]
    UnknownDebugContext(String),
}

/// Why a single control was left out of the render.
///
/// Returned from the per-control render path; siblings keep rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("control has no Id")]
    MissingId,

    #[error("control has no Type")]
    MissingType,

    #[error("control type {0} is not supported")]
    UnknownType(String),

    #[error("Bitmap buttons are not yet supported.")]
    BitmapButtonNotSupported,

    #[error("Icon buttons are not yet supported.")]
    IconButtonNotSupported,

    #[error("Image buttons are not yet supported.")]
    ImageButtonNotSupported,
}
