/*
 * Remembers the most recent key press and the caret position just before
 * that key took effect. A text change that arrives with a recorded key is a
 * user edit; one that arrives without is programmatic. The key is consumed
 * by exactly one text-change notification.
 */

use crate::types::KeyCode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyContext {
    pub last_key: Option<KeyCode>,
    pub caret_before_edit: usize,
}

#[derive(Debug, Default)]
pub struct KeyTracker {
    context: KeyContext,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /*
     * Records a key-down. Enter leaves the caret snapshot alone, since the
     * caller highlights the whole text instead of editing it.
     */
    pub fn record_key_down(&mut self, key: KeyCode, caret: usize) {
        self.context.last_key = Some(key);
        if key != KeyCode::Enter {
            self.context.caret_before_edit = caret;
        }
    }

    /// Takes the key recorded for the current text change, resetting it to none.
    pub fn take_key(&mut self) -> Option<KeyCode> {
        self.context.last_key.take()
    }

    pub fn caret_before_edit(&self) -> usize {
        self.context.caret_before_edit
    }

    pub fn context(&self) -> KeyContext {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_consumed_exactly_once() {
        let mut tracker = KeyTracker::new();
        tracker.record_key_down(KeyCode::Other(0x41), 0);
        assert_eq!(tracker.take_key(), Some(KeyCode::Other(0x41)));
        assert_eq!(tracker.take_key(), None);
    }

    #[test]
    fn caret_snapshot_is_taken_for_editing_keys() {
        let mut tracker = KeyTracker::new();
        tracker.record_key_down(KeyCode::Backspace, 4);
        assert_eq!(tracker.caret_before_edit(), 4);
        assert_eq!(tracker.context().last_key, Some(KeyCode::Backspace));
    }

    #[test]
    fn enter_keeps_previous_caret_snapshot() {
        let mut tracker = KeyTracker::new();
        tracker.record_key_down(KeyCode::Other(0x46), 2);
        tracker.record_key_down(KeyCode::Enter, 5);
        assert_eq!(tracker.caret_before_edit(), 2);
        assert_eq!(tracker.take_key(), Some(KeyCode::Enter));
    }
}
