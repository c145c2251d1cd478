//! Non-fatal render diagnostics.

use std::{fmt, path::PathBuf};

use blueprint_core::Category;

/// Something worth reporting that did not stop the render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// No glyph is known for a category; the fallback glyph was used.
    IconNotFound { category: Category },

    /// The rendered image could not be opened in a viewer.
    ViewerFailed { path: PathBuf, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IconNotFound { category } => {
                write!(f, "no icon found for category `{category}`, using fallback")
            }
            Self::ViewerFailed { path, reason } => {
                write!(f, "could not open `{}`: {reason}", path.display())
            }
        }
    }
}
