//! Error types and result utilities for view, plot and generator operations.

use thiserror::Error;

use crate::views::ViewKind;

/// Convenience type alias for results that may contain a [`DataViewError`].
pub type DataViewResult<T> = Result<T, DataViewError>;

/// Error types that can occur while building views, rendering plots or
/// configuring number generators.
#[derive(Error, Debug)]
pub enum DataViewError {
    /// A renderer was constructed over a stack whose element kind is not the
    /// kind it draws.
    ///
    /// Raised at construction time; the renderer is never created.
    #[error("Type mismatch: {renderer} requires a view, animation or stack of kind {expected}, got {actual}")]
    TypeMismatch {
        renderer: &'static str,
        expected: ViewKind,
        actual: ViewKind,
    },

    /// A composite renderer was given the wrong kind of container.
    #[error("{renderer} only accepts {expected}")]
    ContainerMismatch {
        renderer: &'static str,
        expected: &'static str,
    },

    /// Data whose shape cannot be reconciled with what was already built or
    /// rendered, e.g. a histogram frame with a different bin count.
    #[error("Structural mismatch: {0}")]
    Structure(String),

    /// A renderer that can only draw onto an existing axes was asked to
    /// create its own.
    #[error("{0} can only be plotted on a supplied axis, e.g. as part of an overlay")]
    RequiresAxis(&'static str),

    /// A frame update was requested before the initial render pass.
    #[error("{0} has not been rendered yet; call render before render_frame")]
    NotRendered(&'static str),

    /// A handle does not address a live primitive of the expected kind.
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// An invalid parameter was supplied to an operation.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The options registry could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Writing an exported figure failed.
    #[cfg(feature = "html")]
    #[error("Export error: {0}")]
    Export(#[from] std::io::Error),
}

impl DataViewError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a structural mismatch error
    pub fn structure(details: impl Into<String>) -> Self {
        Self::Structure(details.into())
    }

    /// Create an invalid handle error
    pub fn invalid_handle(details: impl Into<String>) -> Self {
        Self::InvalidHandle(details.into())
    }

    /// Check if this error was raised while constructing a renderer
    pub const fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::TypeMismatch { .. } | Self::ContainerMismatch { .. } | Self::RequiresAxis(_)
        )
    }
}
