//! Per-connection synchronization state machine.
//!
//! Every content transition carries an explicit origin tag instead of a
//! mutable "this came from the server" flag, so a remote apply and a
//! subsequent local edit cannot race over shared state.

/// Where a content transition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote,
}

/// Synchronization status of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Loading,
    Idle,
    Editing,
    Saving,
    SaveError,
}

/// Follow-up work a transition asks the embedding to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Publish(String),
    ScheduleSave(String),
}

/// Tracks one connection's content and save status.
///
/// Remote-origin content is applied and nothing else: a remote apply never
/// yields a publish or save action. That is what keeps two sessions from
/// re-broadcasting each other's updates forever.
#[derive(Debug)]
pub struct SyncMachine {
    status: SyncStatus,
    content: String,
}

impl SyncMachine {
    pub fn new() -> Self {
        Self {
            status: SyncStatus::Loading,
            content: String::new(),
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Apply a content transition tagged with its origin.
    ///
    /// The returned actions are empty for `Origin::Remote`; for
    /// `Origin::Local` they are the publish and the save-timer restart,
    /// in that order.
    pub fn apply(&mut self, origin: Origin, content: String) -> Vec<Action> {
        match origin {
            Origin::Remote => {
                self.content = content;
                // The load payload ends the initial loading phase; later
                // remote updates leave the save status untouched.
                if self.status == SyncStatus::Loading {
                    self.status = SyncStatus::Idle;
                }
                Vec::new()
            }
            Origin::Local => {
                self.content = content.clone();
                self.status = SyncStatus::Editing;
                vec![Action::Publish(content.clone()), Action::ScheduleSave(content)]
            }
        }
    }

    /// The save timer for the last local edit is now pending.
    pub fn save_scheduled(&mut self) {
        if self.status == SyncStatus::Editing {
            self.status = SyncStatus::Saving;
        }
    }

    /// The deferred write landed.
    pub fn save_succeeded(&mut self) {
        if self.status != SyncStatus::Loading {
            self.status = SyncStatus::Idle;
        }
    }

    /// The deferred write failed. No corrective action is taken here; the
    /// next local edit decides what happens next.
    pub fn save_failed(&mut self) {
        self.status = SyncStatus::SaveError;
    }

    /// User-visible status line.
    pub fn status_label(&self) -> &'static str {
        match self.status {
            SyncStatus::Loading => "Loading document...",
            SyncStatus::Idle => "All changes saved",
            SyncStatus::Editing | SyncStatus::Saving => "Saving...",
            SyncStatus::SaveError => "Error while saving",
        }
    }
}

impl Default for SyncMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_loading_and_load_payload_exits_to_idle() {
        let mut machine = SyncMachine::new();
        assert_eq!(machine.status(), SyncStatus::Loading);

        let actions = machine.apply(Origin::Remote, "hello".to_string());
        assert!(actions.is_empty());
        assert_eq!(machine.status(), SyncStatus::Idle);
        assert_eq!(machine.content(), "hello");
    }

    #[test]
    fn remote_apply_never_publishes_or_saves() {
        let mut machine = SyncMachine::new();
        machine.apply(Origin::Remote, String::new());

        // A remote update while editing applies content only.
        machine.apply(Origin::Local, "mine".to_string());
        let actions = machine.apply(Origin::Remote, "theirs".to_string());
        assert!(actions.is_empty());
        assert_eq!(machine.content(), "theirs");
    }

    #[test]
    fn local_edit_publishes_then_schedules_save() {
        let mut machine = SyncMachine::new();
        machine.apply(Origin::Remote, String::new());

        let actions = machine.apply(Origin::Local, "typed".to_string());
        assert_eq!(
            actions,
            vec![
                Action::Publish("typed".to_string()),
                Action::ScheduleSave("typed".to_string()),
            ]
        );
        assert_eq!(machine.status(), SyncStatus::Editing);

        machine.save_scheduled();
        assert_eq!(machine.status(), SyncStatus::Saving);
    }

    #[test]
    fn save_outcome_transitions() {
        let mut machine = SyncMachine::new();
        machine.apply(Origin::Remote, String::new());
        machine.apply(Origin::Local, "x".to_string());
        machine.save_scheduled();

        machine.save_succeeded();
        assert_eq!(machine.status(), SyncStatus::Idle);
        assert_eq!(machine.status_label(), "All changes saved");

        machine.apply(Origin::Local, "xy".to_string());
        machine.save_scheduled();
        machine.save_failed();
        assert_eq!(machine.status(), SyncStatus::SaveError);
        assert_eq!(machine.status_label(), "Error while saving");

        // The next local edit leaves the error state on its own.
        let actions = machine.apply(Origin::Local, "xyz".to_string());
        assert_eq!(actions.len(), 2);
        assert_eq!(machine.status(), SyncStatus::Editing);
    }
}
