//! Op-mode lifecycle tracking.
//!
//! The robot controller reports an active op-mode name and a status string.
//! This module folds those reports into STOPPED / INIT / RUNNING transitions
//! that the animation driver reacts to.

use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};

/// Op-mode name the controller reports while no op-mode is selected.
pub const STOP_TAG: &str = "$Stop$Robot$";

/// Lifecycle state of the active op-mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpModeState {
    /// No op-mode is active.
    #[default]
    Stopped,
    /// An op-mode is initialized and waiting for start.
    Init,
    /// An op-mode is running.
    Running,
}

impl OpModeState {
    /// Parse a controller status string, if recognized.
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "STOPPED" => Some(Self::Stopped),
            "INIT" => Some(Self::Init),
            "RUNNING" => Some(Self::Running),
            _ => None,
        }
    }

    /// Check whether an op-mode is active.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

impl fmt::Display for OpModeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "STOPPED",
            Self::Init => "INIT",
            Self::Running => "RUNNING",
        };
        f.write_str(name)
    }
}

/// A change of lifecycle state or of the active op-mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State being left.
    pub from: OpModeState,
    /// State being entered.
    pub to: OpModeState,
    /// Op-mode active before the transition, empty when stopped.
    pub previous_op_mode: String,
    /// Op-mode active after the transition, empty when stopped.
    pub op_mode: String,
}

impl Transition {
    /// Check whether an op-mode run starts fresh: coming out of STOPPED, or
    /// switching to a differently named op-mode.
    pub fn starts_new_run(&self) -> bool {
        self.to.is_active() && (!self.from.is_active() || self.previous_op_mode != self.op_mode)
    }
}

/// Lifecycle reducer fed with controller status reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpModeLifecycle {
    state: OpModeState,
    op_mode: String,
}

impl OpModeLifecycle {
    /// Start in STOPPED with no op-mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> OpModeState {
        self.state
    }

    /// Name of the active op-mode, empty when stopped.
    pub fn op_mode(&self) -> &str {
        &self.op_mode
    }

    /// Fold in a status report.
    ///
    /// Returns the transition when the state or the active op-mode changed.
    /// An empty op-mode name, the stop tag or a STOPPED status all mean
    /// stopped; unknown status strings are ignored.
    pub fn update(&mut self, active_op_mode: &str, status: &str) -> Option<Transition> {
        let stopped =
            active_op_mode.is_empty() || active_op_mode == STOP_TAG || status == "STOPPED";
        let (to, op_mode) = if stopped {
            (OpModeState::Stopped, "")
        } else {
            match OpModeState::from_status(status)? {
                OpModeState::Stopped => (OpModeState::Stopped, ""),
                active => (active, active_op_mode),
            }
        };
        if to == self.state && op_mode == self.op_mode {
            return None;
        }

        let transition = Transition {
            from: self.state,
            to,
            previous_op_mode: std::mem::take(&mut self.op_mode),
            op_mode: op_mode.to_string(),
        };
        info!(
            "op-mode {} `{}` -> {} `{}`",
            transition.from, transition.previous_op_mode, transition.to, transition.op_mode
        );
        self.state = to;
        self.op_mode = transition.op_mode.clone();
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_ignores_stop_reports() {
        let mut lifecycle = OpModeLifecycle::new();
        assert_eq!(lifecycle.update("", "INIT"), None);
        assert_eq!(lifecycle.update(STOP_TAG, "RUNNING"), None);
        assert_eq!(lifecycle.update("Auto", "STOPPED"), None);
        assert_eq!(lifecycle.state(), OpModeState::Stopped);
    }

    #[test]
    fn full_run() {
        let mut lifecycle = OpModeLifecycle::new();
        let init = lifecycle.update("Auto", "INIT").unwrap();
        assert_eq!((init.from, init.to), (OpModeState::Stopped, OpModeState::Init));
        assert!(init.starts_new_run());

        let running = lifecycle.update("Auto", "RUNNING").unwrap();
        assert_eq!(running.to, OpModeState::Running);
        assert!(!running.starts_new_run());
        assert_eq!(lifecycle.update("Auto", "RUNNING"), None);

        let stop = lifecycle.update(STOP_TAG, "RUNNING").unwrap();
        assert_eq!(stop.to, OpModeState::Stopped);
        assert_eq!(stop.previous_op_mode, "Auto");
        assert_eq!(lifecycle.op_mode(), "");
    }

    #[test]
    fn switching_op_mode_starts_new_run() {
        let mut lifecycle = OpModeLifecycle::new();
        lifecycle.update("Auto", "INIT");
        let switch = lifecycle.update("TeleOp", "INIT").unwrap();
        assert_eq!(switch.from, OpModeState::Init);
        assert_eq!(switch.to, OpModeState::Init);
        assert!(switch.starts_new_run());
    }

    #[test]
    fn unknown_status_is_ignored() {
        let mut lifecycle = OpModeLifecycle::new();
        lifecycle.update("Auto", "RUNNING");
        assert_eq!(lifecycle.update("Auto", "EMERGENCY"), None);
        assert_eq!(lifecycle.state(), OpModeState::Running);
    }

    #[test]
    fn state_serializes_like_status_strings() {
        let json = serde_json::to_string(&OpModeState::Running).unwrap();
        assert_eq!(json, "\"RUNNING\"");
    }
}
