/*
 * Builds the two interceptors bound to a combobox's sub-windows.
 *
 * The edit interceptor watches WM_SETTEXT (proposed text) and WM_KEYDOWN; the
 * list interceptor watches LB_SETTOPINDEX. Hooks hold only a weak reference
 * to the orchestrator, so an interceptor that outlives it degrades to plain
 * pass-through instead of keeping it alive.
 */

use crate::combo::{AutocompleteCombo, ComboHost};
use crate::error::Result as PlatformResult;
use crate::interceptor::MessageInterceptor;
use crate::types::{KeyCode, LB_SETTOPINDEX, MessagePayload, WM_KEYDOWN, WM_SETTEXT};

use std::rc::Rc;

pub fn edit_interceptor<H: ComboHost>(
    combo: &Rc<AutocompleteCombo<H>>,
) -> PlatformResult<MessageInterceptor> {
    let mut interceptor = MessageInterceptor::new("edit").with_trace(combo.config().trace_messages);

    let weak = Rc::downgrade(combo);
    interceptor.register(WM_SETTEXT, move |envelope| {
        if let Some(combo) = weak.upgrade() {
            combo.handle_edit_set_text(envelope);
        }
    })?;

    let weak = Rc::downgrade(combo);
    interceptor.register(WM_KEYDOWN, move |envelope| {
        let MessagePayload::Raw { wparam, .. } = envelope.payload else {
            return;
        };
        if let Some(combo) = weak.upgrade() {
            combo.on_key_down(KeyCode::from_virtual_key(wparam as u32));
        }
    })?;

    Ok(interceptor)
}

pub fn list_interceptor<H: ComboHost>(
    combo: &Rc<AutocompleteCombo<H>>,
) -> PlatformResult<MessageInterceptor> {
    let mut interceptor = MessageInterceptor::new("list").with_trace(combo.config().trace_messages);

    let weak = Rc::downgrade(combo);
    interceptor.register(LB_SETTOPINDEX, move |envelope| {
        if let Some(combo) = weak.upgrade() {
            combo.handle_list_set_top_row(envelope);
        }
    })?;

    Ok(interceptor)
}
