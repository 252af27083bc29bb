/*
 * Orchestrates case-sensitive inline autocomplete on top of a native combobox.
 *
 * The host control keeps its own rendering, focus handling and drop-down
 * mechanics; `ComboHost` is the narrow surface this module reads and mutates.
 * Keystrokes feed the `KeyTracker`, text changes feed the `MatchState`, and
 * the edit/list interceptors give this module a veto over native attempts to
 * display text or auto-select rows that disagree with the committed match.
 *
 * All mutations of the control are deferred to the next idle turn through the
 * `IdleQueue`, never applied from inside the native callback that caused them.
 * This is the only module that mutates the visible text, caret and selection.
 */

use crate::error::Result as PlatformResult;
use crate::idle_queue::IdleQueue;
use crate::key_tracker::KeyTracker;
use crate::matcher::{EditOutcome, ItemList, MatchState, canonical_text, caret_after_backspace};
use crate::types::{AutocompleteConfig, KeyCode, MessageEnvelope};

use std::cell::{Cell, RefCell};

// Upper bound on idle turns drained by `run_until_idle`.
const MAX_DRAIN_TURNS: usize = 64;

/*
 * What the autocomplete core needs from the control it augments. Carets and
 * selections are char offsets into the full text. Mutators may synchronously
 * deliver native messages back into the interceptors, so implementations must
 * not hold borrows across them.
 */
pub trait ComboHost: ItemList + 'static {
    /// Dropping the lock resumes repaint of the whole control.
    type RepaintLock: 'static;

    fn is_dropped_down(&self) -> bool;
    fn selected_index(&self) -> Option<usize>;
    fn set_selected_index(&self, index: Option<usize>) -> PlatformResult<()>;
    fn text(&self) -> String;
    fn set_text(&self, text: &str) -> PlatformResult<()>;
    fn selection_start(&self) -> usize;
    fn selection_length(&self) -> usize;
    fn set_selection(&self, start: usize, length: usize) -> PlatformResult<()>;
    fn select_all(&self) -> PlatformResult<()>;
    fn suspend_repaint(&self) -> Self::RepaintLock;
    /// Asks the event loop to call `run_idle_turn` once it is idle.
    fn request_idle_turn(&self);
}

pub struct AutocompleteCombo<H: ComboHost> {
    host: H,
    config: AutocompleteConfig,
    matcher: Cell<MatchState>,
    tracker: RefCell<KeyTracker>,
    idle: IdleQueue<AutocompleteCombo<H>>,
    wake_pending: Cell<bool>,
}

impl<H: ComboHost> AutocompleteCombo<H> {
    pub fn new(host: H, config: AutocompleteConfig) -> Self {
        Self {
            host,
            config,
            matcher: Cell::new(MatchState::new()),
            tracker: RefCell::new(KeyTracker::new()),
            idle: IdleQueue::new(),
            wake_pending: Cell::new(false),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &AutocompleteConfig {
        &self.config
    }

    /// Index of the item committed as the case-sensitive match, if any.
    pub fn committed_match(&self) -> Option<usize> {
        self.matcher.get().committed()
    }

    pub fn pending_idle_tasks(&self) -> usize {
        self.idle.len()
    }

    fn update_match<R>(&self, f: impl FnOnce(&mut MatchState) -> R) -> R {
        let mut state = self.matcher.get();
        let result = f(&mut state);
        self.matcher.set(state);
        result
    }

    fn schedule<F>(&self, task: F)
    where
        F: FnOnce(&Self) + 'static,
    {
        self.idle.schedule(task);
        self.request_wake();
    }

    fn request_wake(&self) {
        if !self.wake_pending.replace(true) {
            self.host.request_idle_turn();
        }
    }

    /// Runs one idle turn. Called by the host's event loop.
    pub fn run_idle_turn(&self) -> usize {
        self.wake_pending.set(false);
        let ran = self.idle.run_turn(self);
        if !self.idle.is_empty() {
            self.request_wake();
        }
        ran
    }

    /// Runs idle turns until no work is left. For hosts without an event loop.
    pub fn run_until_idle(&self) {
        for _ in 0..MAX_DRAIN_TURNS {
            if self.idle.is_empty() {
                self.wake_pending.set(false);
                return;
            }
            self.wake_pending.set(false);
            self.idle.run_turn(self);
        }
        log::warn!(
            "AutocompleteCombo: idle queue still holds {} tasks after {MAX_DRAIN_TURNS} turns",
            self.idle.len()
        );
    }

    /*
     * Key-down on the edit area, before the key takes effect. Enter schedules
     * a select-all so the completed text can be overwritten in one go.
     */
    pub fn on_key_down(&self, key: KeyCode) {
        let caret = self.host.selection_start();
        self.tracker.borrow_mut().record_key_down(key, caret);
        log::trace!("AutocompleteCombo: key {key:?} with caret at {caret}");

        if key == KeyCode::Enter && self.config.select_all_on_enter {
            self.schedule(|combo| {
                if let Err(err) = combo.host.select_all() {
                    log::warn!("AutocompleteCombo: select-all after Enter failed: {err}");
                }
            });
        }
    }

    /// The user explicitly picked `index`; it becomes the committed match as is.
    pub fn on_selection_committed(&self, index: Option<usize>) {
        log::debug!("AutocompleteCombo: selection committed to {index:?}");
        self.update_match(|state| state.commit(index));
    }

    /*
     * The host is about to replace its items. A committed index would point
     * into the old list, so the match is dropped before the items change.
     */
    pub fn reset_match(&self) {
        log::debug!("AutocompleteCombo: item list replaced, clearing committed match");
        self.update_match(MatchState::clear);
    }

    /*
     * Text-change notification. Consumes the recorded key: without one the
     * change is programmatic and only reconciled, with one it is a user edit
     * and is re-matched on the next idle turn.
     */
    pub fn on_text_changed(&self) {
        let (key, caret_before_edit) = {
            let mut tracker = self.tracker.borrow_mut();
            (tracker.take_key(), tracker.caret_before_edit())
        };

        match key {
            None => self.reconcile_programmatic_change(),
            Some(key) => self.schedule(move |combo| combo.apply_user_edit(key, caret_before_edit)),
        }
    }

    fn reconcile_programmatic_change(&self) {
        let visible = self.host.text();
        let correction = self.matcher.get().correction_for(&self.host, &visible);
        if let Some(canonical) = correction {
            self.schedule(move |combo| combo.assign_text(&canonical));
        }
    }

    fn apply_user_edit(&self, key: KeyCode, caret_before_edit: usize) {
        if key == KeyCode::Backspace {
            let target = caret_after_backspace(caret_before_edit);
            if let Err(err) = self.host.set_selection(target, 0) {
                log::warn!("AutocompleteCombo: moving caret after backspace failed: {err}");
                return;
            }
            if self.host.selection_start() == 0 {
                log::debug!("AutocompleteCombo: backspaced to the start, clearing");
                self.schedule(|combo| combo.clear_to_empty());
                return;
            }
        }

        let text = self.host.text();
        let caret = self.host.selection_start();
        let outcome = self.update_match(|state| state.evaluate_edit(&self.host, &text, caret));
        if let EditOutcome::Matched { index, caret, .. } = outcome {
            self.schedule(move |combo| combo.select_index_keeping_caret(index, caret));
        }
    }

    /*
     * Shows the full item text while keeping the typed prefix unselected and
     * highlighting the suggested remainder.
     */
    fn select_index_keeping_caret(&self, index: usize, caret: usize) {
        if let Err(err) = self.host.set_selected_index(Some(index)) {
            log::warn!("AutocompleteCombo: selecting item {index} failed: {err}");
            return;
        }
        self.reconcile_programmatic_change();

        let length = self.host.text().chars().count();
        let caret = caret.min(length);
        if let Err(err) = self.host.set_selection(caret, length - caret) {
            log::warn!("AutocompleteCombo: restoring caret to {caret} failed: {err}");
        }
    }

    fn clear_to_empty(&self) {
        self.update_match(MatchState::clear);
        self.assign_text("");
    }

    fn assign_text(&self, text: &str) {
        if let Err(err) = self.host.set_text(text) {
            log::warn!("AutocompleteCombo: assigning text '{text}' failed: {err}");
            return;
        }
        self.reconcile_programmatic_change();
    }

    /*
     * List sub-window is about to change its top row. While dropped down, the
     * native list jumps to its own case-insensitive prefix match; veto that and
     * re-select the committed match once the native handler has returned.
     * Repaint stays suspended until the override ran, even if it fails.
     */
    pub fn handle_list_set_top_row(&self, envelope: &mut MessageEnvelope) {
        if !self.host.is_dropped_down() {
            return;
        }
        let Some(committed) = self.committed_match() else {
            return;
        };
        if self.host.selected_index() == Some(committed) {
            return;
        }

        log::debug!(
            "AutocompleteCombo: vetoing native top row {:?}, re-selecting {committed} (native {:?})",
            envelope.row(),
            self.host.selected_index()
        );
        let lock = self.host.suspend_repaint();
        envelope.cancel = true;
        self.schedule(move |combo| {
            let _lock = lock;
            match combo.host.set_selected_index(Some(committed)) {
                Ok(()) => combo.reconcile_programmatic_change(),
                Err(err) => {
                    log::warn!("AutocompleteCombo: overriding list selection failed: {err}")
                }
            }
        });
    }

    /*
     * Edit sub-window is about to display new text. Text that disagrees with
     * the committed match never reaches the screen; the canonical text is
     * assigned instead. Unreadable payloads are ignored for this cycle.
     */
    pub fn handle_edit_set_text(&self, envelope: &mut MessageEnvelope) {
        let Some(proposed) = envelope.text() else {
            log::trace!("AutocompleteCombo: WM_SETTEXT without readable text, ignoring");
            return;
        };
        let Some(committed) = self.committed_match() else {
            return;
        };

        let canonical = canonical_text(&self.host, committed);
        if proposed != canonical {
            log::debug!(
                "AutocompleteCombo: vetoing text '{proposed}', committed item {committed} is '{canonical}'"
            );
            envelope.cancel = true;
            self.schedule(move |combo| combo.assign_text(&canonical));
        }
    }
}
