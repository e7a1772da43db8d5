//! Toast notification slot.

use std::fmt;
use std::time::Duration;

/// How long a toast stays visible after it was last set.
pub const TOAST_RESET: Duration = Duration::from_millis(4000);

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastVariant {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
    /// Neutral information.
    #[default]
    Info,
}

impl ToastVariant {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastVariant::Success => "success",
            ToastVariant::Error => "error",
            ToastVariant::Info => "info",
        }
    }
}

impl fmt::Display for ToastVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single notification slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Toast {
    /// Severity.
    pub variant: ToastVariant,
    /// Message, or `None` when nothing is shown.
    pub message: Option<String>,
}

impl Toast {
    /// Returns true if a message is currently shown.
    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }
}
