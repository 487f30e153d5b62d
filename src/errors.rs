//! Error type for the forward mapper.
//!
//! The population engine is deliberately permissive: an unmatched conversion
//! rule falls back to raw assignment and a null result on a non-nullable
//! field is simply discarded. The only fatal outcome is a nested body that
//! needs a target child which neither exists nor can be constructed, which
//! is a missing-customization contract violation surfaced to the caller.

use std::fmt;

/// Error raised while populating a target from a request body.
#[derive(Debug)]
pub enum PopulateError {
    /// A nested body required a target child that does not exist, and no
    /// hook supplied construction logic for it.
    UnhandledChild {
        /// Type name of the nested request body.
        body_type: &'static str,
        /// Field on the target that could not be populated.
        field: String,
    },

    /// A custom hook failed with its own message.
    Hook {
        /// Hook-supplied failure description.
        message: String,
    },
}

impl PopulateError {
    pub fn unhandled_child(body_type: &'static str, field: impl Into<String>) -> Self {
        let field = field.into();
        tracing::debug!(body_type, field, "no handler for nested body without an existing target child");
        Self::UnhandledChild { body_type, field }
    }

    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook {
            message: message.into(),
        }
    }
}

impl fmt::Display for PopulateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnhandledChild { body_type, field } => write!(
                f,
                "cannot convert nested body '{body_type}' for field '{field}': no existing target child and no construction hook"
            ),
            Self::Hook { message } => write!(f, "population hook failed: {message}"),
        }
    }
}

impl std::error::Error for PopulateError {}
