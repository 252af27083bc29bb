/*
 * In-memory stand-in for a native editable combobox, used by unit tests.
 * Emulates the parts of native behaviour the autocomplete core depends on:
 * typing replaces the selection, backspace deletes the selection or the char
 * before the caret, and selecting an item shows its text fully selected.
 */

use crate::combo::ComboHost;
use crate::error::{PlatformError, Result as PlatformResult};
use crate::matcher::ItemList;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Default)]
struct FakeState {
    items: Vec<String>,
    text: Vec<char>,
    selection_start: usize,
    selection_length: usize,
    selected_index: Option<usize>,
    dropped_down: bool,
}

#[derive(Debug, Default)]
pub(crate) struct FakeHost {
    state: RefCell<FakeState>,
    repaint_depth: Rc<Cell<u32>>,
    set_text_calls: Cell<usize>,
    idle_requests: Cell<usize>,
    fail_selection: Cell<bool>,
    panic_on_selection: Cell<bool>,
}

pub(crate) struct FakeRepaintLock(Rc<Cell<u32>>);

impl Drop for FakeRepaintLock {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl FakeHost {
    pub(crate) fn with_items(items: &[&str]) -> Self {
        let host = Self::default();
        host.set_items(items);
        host
    }

    pub(crate) fn set_items(&self, items: &[&str]) {
        self.state.borrow_mut().items = items.iter().map(|s| s.to_string()).collect();
    }

    pub(crate) fn set_dropped_down(&self, dropped_down: bool) {
        self.state.borrow_mut().dropped_down = dropped_down;
    }

    pub(crate) fn fail_selection(&self, fail: bool) {
        self.fail_selection.set(fail);
    }

    pub(crate) fn panic_on_selection(&self, panic: bool) {
        self.panic_on_selection.set(panic);
    }

    pub(crate) fn repaint_depth(&self) -> u32 {
        self.repaint_depth.get()
    }

    pub(crate) fn set_text_calls(&self) -> usize {
        self.set_text_calls.get()
    }

    pub(crate) fn idle_requests(&self) -> usize {
        self.idle_requests.get()
    }

    /// User types `ch`, replacing the current selection.
    pub(crate) fn type_char(&self, ch: char) {
        let mut state = self.state.borrow_mut();
        let start = state.selection_start;
        let end = start + state.selection_length;
        state.text.drain(start..end);
        state.text.insert(start, ch);
        state.selection_start = start + 1;
        state.selection_length = 0;
    }

    /// User presses backspace.
    pub(crate) fn backspace(&self) {
        let mut state = self.state.borrow_mut();
        let start = state.selection_start;
        if state.selection_length > 0 {
            let end = start + state.selection_length;
            state.text.drain(start..end);
        } else if start > 0 {
            state.text.remove(start - 1);
            state.selection_start = start - 1;
        }
        state.selection_length = 0;
    }

    /// The native control selects `index` on its own (list pick, prefix jump).
    pub(crate) fn pick_natively(&self, index: usize) {
        let mut state = self.state.borrow_mut();
        let text = state.items.get(index).cloned().unwrap_or_default();
        state.text = text.chars().collect();
        state.selected_index = Some(index);
        state.selection_start = 0;
        state.selection_length = state.text.len();
    }

    /// The native control rewrites the text without the core's involvement.
    pub(crate) fn overwrite_text_natively(&self, text: &str) {
        let mut state = self.state.borrow_mut();
        state.text = text.chars().collect();
        state.selection_start = 0;
        state.selection_length = 0;
    }
}

impl ItemList for FakeHost {
    fn item_count(&self) -> usize {
        self.state.borrow().items.len()
    }

    fn item_text(&self, index: usize) -> Option<String> {
        self.state.borrow().items.get(index).cloned()
    }
}

impl ComboHost for FakeHost {
    type RepaintLock = FakeRepaintLock;

    fn is_dropped_down(&self) -> bool {
        self.state.borrow().dropped_down
    }

    fn selected_index(&self) -> Option<usize> {
        self.state.borrow().selected_index
    }

    fn set_selected_index(&self, index: Option<usize>) -> PlatformResult<()> {
        if self.panic_on_selection.get() {
            panic!("native selection blew up");
        }
        if self.fail_selection.get() {
            return Err(PlatformError::OperationFailed("CB_SETCURSEL rejected".into()));
        }
        match index {
            Some(index) => self.pick_natively(index),
            None => {
                let mut state = self.state.borrow_mut();
                state.selected_index = None;
                state.text.clear();
                state.selection_start = 0;
                state.selection_length = 0;
            }
        }
        Ok(())
    }

    fn text(&self) -> String {
        self.state.borrow().text.iter().collect()
    }

    fn set_text(&self, text: &str) -> PlatformResult<()> {
        self.set_text_calls.set(self.set_text_calls.get() + 1);
        self.overwrite_text_natively(text);
        Ok(())
    }

    fn selection_start(&self) -> usize {
        self.state.borrow().selection_start
    }

    fn selection_length(&self) -> usize {
        self.state.borrow().selection_length
    }

    fn set_selection(&self, start: usize, length: usize) -> PlatformResult<()> {
        let mut state = self.state.borrow_mut();
        let len = state.text.len();
        state.selection_start = start.min(len);
        state.selection_length = length.min(len - state.selection_start);
        Ok(())
    }

    fn select_all(&self) -> PlatformResult<()> {
        let mut state = self.state.borrow_mut();
        state.selection_start = 0;
        state.selection_length = state.text.len();
        Ok(())
    }

    fn suspend_repaint(&self) -> FakeRepaintLock {
        self.repaint_depth.set(self.repaint_depth.get() + 1);
        FakeRepaintLock(self.repaint_depth.clone())
    }

    fn request_idle_turn(&self) {
        self.idle_requests.set(self.idle_requests.get() + 1);
    }
}
