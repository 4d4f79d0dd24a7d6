//! Native browser dialogs (alert, confirm, prompt, beforeunload).
//!
//! Drivers route every dialog the page opens through a [`DialogLog`], which
//! decides the response from the session's [`DialogPolicy`] and records the
//! dialog so scenarios can inspect its message afterwards.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Type of browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogType {
    /// Alert dialog (OK button only)
    Alert,
    /// Confirm dialog (OK/Cancel buttons)
    Confirm,
    /// Prompt dialog (text input + OK/Cancel)
    Prompt,
    /// Before unload dialog (Leave/Stay buttons)
    BeforeUnload,
}

impl std::fmt::Display for DialogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => write!(f, "alert"),
            Self::Confirm => write!(f, "confirm"),
            Self::Prompt => write!(f, "prompt"),
            Self::BeforeUnload => write!(f, "beforeunload"),
        }
    }
}

impl DialogType {
    /// Parse the CDP dialog type name
    #[must_use]
    pub fn from_cdp(name: &str) -> Self {
        match name {
            "confirm" => Self::Confirm,
            "prompt" => Self::Prompt,
            "beforeunload" => Self::BeforeUnload,
            _ => Self::Alert,
        }
    }
}

/// Response given to a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogAction {
    /// Dialog was accepted (OK/Yes/Leave)
    Accept,
    /// Dialog was dismissed (Cancel/No/Stay)
    Dismiss,
}

/// How a session answers dialogs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogPolicy {
    /// Accept every dialog
    AcceptAll,
    /// Dismiss every dialog
    #[default]
    DismissAll,
}

impl DialogPolicy {
    /// Action this policy takes
    #[must_use]
    pub const fn action(self) -> DialogAction {
        match self {
            Self::AcceptAll => DialogAction::Accept,
            Self::DismissAll => DialogAction::Dismiss,
        }
    }
}

/// A dialog that was opened and answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    /// Type of dialog
    pub dialog_type: DialogType,
    /// Message displayed in the dialog
    pub message: String,
    /// Action taken
    pub action: DialogAction,
}

impl Dialog {
    /// Whether the dialog was accepted
    #[must_use]
    pub fn accepted(&self) -> bool {
        self.action == DialogAction::Accept
    }
}

/// Shared record of the dialogs seen by one session
#[derive(Debug, Clone, Default)]
pub struct DialogLog {
    dialogs: Arc<Mutex<Vec<Dialog>>>,
    policy: Arc<Mutex<DialogPolicy>>,
}

impl DialogLog {
    /// Create an empty log that dismisses dialogs
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Change how future dialogs are answered
    pub fn set_policy(&self, policy: DialogPolicy) {
        if let Ok(mut p) = self.policy.lock() {
            *p = policy;
        }
    }

    /// Current policy
    #[must_use]
    pub fn policy(&self) -> DialogPolicy {
        self.policy.lock().map(|p| *p).unwrap_or_default()
    }

    /// Answer an incoming dialog according to the policy and record it
    pub fn handle(&self, dialog_type: DialogType, message: impl Into<String>) -> Dialog {
        let dialog = Dialog {
            dialog_type,
            message: message.into(),
            action: self.policy().action(),
        };
        tracing::info!(
            dialog_type = %dialog.dialog_type,
            message = %dialog.message,
            action = ?dialog.action,
            "dialog handled"
        );
        if let Ok(mut dialogs) = self.dialogs.lock() {
            dialogs.push(dialog.clone());
        }
        dialog
    }

    /// Get all dialogs encountered
    #[must_use]
    pub fn dialogs(&self) -> Vec<Dialog> {
        self.dialogs.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// Get last dialog
    #[must_use]
    pub fn last_dialog(&self) -> Option<Dialog> {
        self.dialogs.lock().ok().and_then(|d| d.last().cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod dialog_log_tests {
        use super::*;

        #[test]
        fn test_default_policy_dismisses() {
            let log = DialogLog::new();
            let dialog = log.handle(DialogType::Confirm, "Press OK to proceed!");
            assert_eq!(dialog.action, DialogAction::Dismiss);
            assert!(!dialog.accepted());
        }

        #[test]
        fn test_accept_all_policy() {
            let log = DialogLog::new();
            log.set_policy(DialogPolicy::AcceptAll);
            let dialog = log.handle(DialogType::Confirm, "Press OK to proceed!");
            assert!(dialog.accepted());
            assert_eq!(log.last_dialog().unwrap().message, "Press OK to proceed!");
        }

        #[test]
        fn test_clones_share_history() {
            let log = DialogLog::new();
            let other = log.clone();
            other.handle(DialogType::Alert, "hi");
            assert_eq!(log.dialogs().len(), 1);
        }

        #[test]
        fn test_from_cdp() {
            assert_eq!(DialogType::from_cdp("confirm"), DialogType::Confirm);
            assert_eq!(DialogType::from_cdp("beforeunload"), DialogType::BeforeUnload);
            assert_eq!(DialogType::from_cdp("alert"), DialogType::Alert);
            assert_eq!(DialogType::Prompt.to_string(), "prompt");
        }
    }
}
