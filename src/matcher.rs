/*
 * Case-sensitive inline autocomplete matching.
 *
 * `MatchState` is the only state the core keeps across keystrokes: the index
 * of the item currently committed as the case-sensitive best match, or none.
 * While it holds an index, the item at that index starts with the text typed
 * up to the caret as of the last recomputation.
 *
 * The matcher decides; it never touches the control. The orchestrator applies
 * its decisions on the next idle turn.
 */

use crate::types::prefix_to_caret;

/// Read-only view of the host's item list.
pub trait ItemList {
    fn item_count(&self) -> usize;
    /// Returns `None` for indices beyond the current count.
    fn item_text(&self, index: usize) -> Option<String>;
}

impl ItemList for [String] {
    fn item_count(&self) -> usize {
        self.len()
    }

    fn item_text(&self, index: usize) -> Option<String> {
        self.get(index).cloned()
    }
}

impl ItemList for [&str] {
    fn item_count(&self) -> usize {
        self.len()
    }

    fn item_text(&self, index: usize) -> Option<String> {
        self.get(index).map(|s| (*s).to_string())
    }
}

impl ItemList for Vec<String> {
    fn item_count(&self) -> usize {
        self.len()
    }

    fn item_text(&self, index: usize) -> Option<String> {
        self.get(index).cloned()
    }
}

/// Display string of `index`, reading a missing item as empty.
pub fn canonical_text<L: ItemList + ?Sized>(items: &L, index: usize) -> String {
    items.item_text(index).unwrap_or_default()
}

/// Lowest index whose display string starts with `prefix`, compared exactly.
pub fn first_prefix_match<L: ItemList + ?Sized>(items: &L, prefix: &str) -> Option<usize> {
    (0..items.item_count()).find(|&index| canonical_text(items, index).starts_with(prefix))
}

/// Where backspace leaves the caret, given its position before the key.
pub fn caret_after_backspace(caret_before_edit: usize) -> usize {
    caret_before_edit.saturating_sub(1)
}

/// Result of re-evaluating a user edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Nothing typed before the caret; the match was cleared.
    Empty,
    /// No item starts with the typed prefix; the match was cleared.
    NoMatch,
    /// `index` is now committed; the control should show its text with the
    /// caret kept at `caret` and everything after it highlighted.
    Matched { index: usize, caret: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchState {
    committed: Option<usize>,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> Option<usize> {
        self.committed
    }

    /// Authoritative commit from an explicit pick; bypasses the scan.
    pub fn commit(&mut self, index: Option<usize>) {
        log::debug!("Matcher: committed {:?} -> {index:?}", self.committed);
        self.committed = index;
    }

    pub fn clear(&mut self) {
        self.commit(None);
    }

    /*
     * Re-scans the items for the text typed up to `caret` and updates the
     * committed match. Ties go to the lowest index.
     */
    pub fn evaluate_edit<L: ItemList + ?Sized>(
        &mut self,
        items: &L,
        text: &str,
        caret: usize,
    ) -> EditOutcome {
        let typed = prefix_to_caret(text, caret);
        if typed.is_empty() {
            self.clear();
            return EditOutcome::Empty;
        }

        log::trace!("Matcher: scanning {} items for '{typed}'", items.item_count());
        match first_prefix_match(items, typed) {
            Some(index) => {
                self.commit(Some(index));
                EditOutcome::Matched {
                    index,
                    caret: typed.chars().count(),
                }
            }
            None => {
                self.clear();
                EditOutcome::NoMatch
            }
        }
    }

    /*
     * For a text change the user did not type: returns the canonical text to
     * restore when the visible text disagrees with the committed match.
     * Never re-matches.
     */
    pub fn correction_for<L: ItemList + ?Sized>(
        &self,
        items: &L,
        visible_text: &str,
    ) -> Option<String> {
        let index = self.committed?;
        let canonical = canonical_text(items, index);
        if canonical == visible_text {
            None
        } else {
            log::debug!("Matcher: {index} shows '{visible_text}', expected '{canonical}'");
            Some(canonical)
        }
    }
}
