//! Reveal events and state transitions
//!
//! Visibility changes are delivered as plain event ids so that any small
//! state enum can react to them through [`StateTransitions`].

use serde::Serialize;
use std::fmt;
use std::hash::Hash;

/// Event type identifier
pub type EventType = u32;

/// Host and visibility event types
pub mod event_types {
    use super::EventType;

    /// Region intersection reached its threshold
    pub const ENTER_VIEW: EventType = 1;
    /// Region intersection fell below its threshold
    pub const LEAVE_VIEW: EventType = 2;

    pub const SCROLL: EventType = 30;
    pub const RESIZE: EventType = 40;

    // Region lifecycle events
    pub const MOUNT: EventType = 60;
    pub const UNMOUNT: EventType = 61;
}

/// Trait for state enums that transition on events
pub trait StateTransitions: Clone + Copy + PartialEq + Eq + Hash + fmt::Debug + 'static {
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: EventType) -> Option<Self>;
}

/// Whether a section's content is revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealState {
    #[default]
    Hidden,
    Visible,
}

impl RevealState {
    /// The state implied by a visibility observation
    pub fn from_visible(visible: bool) -> Self {
        if visible {
            RevealState::Visible
        } else {
            RevealState::Hidden
        }
    }

    /// The event that would move a region into this visibility
    pub fn event_for(visible: bool) -> EventType {
        if visible {
            event_types::ENTER_VIEW
        } else {
            event_types::LEAVE_VIEW
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, RevealState::Visible)
    }

    /// Class name applied to the wrapped content for this state
    pub fn class_name(&self) -> &'static str {
        match self {
            RevealState::Hidden => "hidden",
            RevealState::Visible => "visible",
        }
    }
}

impl StateTransitions for RevealState {
    fn on_event(&self, event: EventType) -> Option<Self> {
        use event_types::*;
        match (self, event) {
            (RevealState::Hidden, ENTER_VIEW) => Some(RevealState::Visible),
            (RevealState::Visible, LEAVE_VIEW) => Some(RevealState::Hidden),
            _ => None,
        }
    }
}

impl fmt::Display for RevealState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

#[cfg(test)]
mod tests {
    use super::event_types::*;
    use super::*;

    #[test]
    fn test_reveal_transitions() {
        let state = RevealState::default();
        assert_eq!(state, RevealState::Hidden);

        let state = state.on_event(ENTER_VIEW).unwrap();
        assert_eq!(state, RevealState::Visible);

        let state = state.on_event(LEAVE_VIEW).unwrap();
        assert_eq!(state, RevealState::Hidden);
    }

    #[test]
    fn test_repeated_event_is_ignored() {
        assert_eq!(RevealState::Hidden.on_event(LEAVE_VIEW), None);
        assert_eq!(RevealState::Visible.on_event(ENTER_VIEW), None);
        assert_eq!(RevealState::Visible.on_event(SCROLL), None);
    }

    #[test]
    fn test_event_for_matches_state() {
        for visible in [false, true] {
            let target = RevealState::from_visible(visible);
            let from = if visible {
                RevealState::Hidden
            } else {
                RevealState::Visible
            };
            assert_eq!(from.on_event(RevealState::event_for(visible)), Some(target));
        }
    }

    #[test]
    fn test_class_name() {
        assert_eq!(RevealState::Hidden.to_string(), "hidden");
        assert_eq!(RevealState::Visible.class_name(), "visible");
    }
}
