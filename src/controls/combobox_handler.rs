/*
 * Encapsulates Win32-specific operations for autocompleting ComboBox controls.
 * Provides creation of an editable combobox, item management, the
 * `ComboHost` implementation the autocomplete core drives, and routing of the
 * parent window's WM_COMMAND notifications into the core.
 */

use crate::combo::{AutocompleteCombo, ComboHost};
use crate::controls::subclass::{self, InterceptorHandle};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::matcher::ItemList;
use crate::subwindows::{edit_interceptor, list_interceptor};
use crate::types::{AutocompleteConfig, char_to_utf16_offset, utf16_to_char_offset};
use crate::window_common::{
    ComboSubwindows, WM_APP_RUN_IDLE_TURN, highord_from_wparam, make_lparam, read_window_text,
    resolve_combo_subwindows,
};

use std::rc::Rc;
use windows::Win32::{
    Foundation::{HINSTANCE, HWND, LPARAM, WPARAM},
    Graphics::Gdi::LockWindowUpdate,
    UI::WindowsAndMessaging::{
        CreateWindowExW, DestroyWindow, HMENU, PostMessageW, SendMessageW, SetWindowTextW,
        WINDOW_EX_STYLE, WINDOW_STYLE, WS_CHILD, WS_TABSTOP, WS_VISIBLE, WS_VSCROLL,
    },
};
use windows::core::{HSTRING, PCWSTR};

const WC_COMBOBOX: PCWSTR = windows::core::w!("COMBOBOX");

// ComboBox styles
const CBS_DROPDOWN: u32 = 0x0002;
const CBS_AUTOHSCROLL: u32 = 0x0040;
const CBS_HASSTRINGS: u32 = 0x0200;

// ComboBox messages
const CB_GETEDITSEL: u32 = 0x0140;
const CB_SETEDITSEL: u32 = 0x0142;
const CB_ADDSTRING: u32 = 0x0143;
const CB_GETCOUNT: u32 = 0x0146;
const CB_GETCURSEL: u32 = 0x0147;
const CB_GETLBTEXT: u32 = 0x0148;
const CB_GETLBTEXTLEN: u32 = 0x0149;
const CB_RESETCONTENT: u32 = 0x014B;
const CB_SETCURSEL: u32 = 0x014E;
const CB_GETDROPPEDSTATE: u32 = 0x0157;
const CB_ERR: isize = -1;

// ComboBox notifications (HIWORD of WM_COMMAND's wParam)
const CBN_SELCHANGE: i32 = 1;
const CBN_EDITCHANGE: i32 = 5;

fn index_from_raw(raw: isize) -> Option<usize> {
    if raw < 0 { None } else { Some(raw as usize) }
}

/// `ComboHost` over a native editable combobox and its sub-windows.
#[derive(Debug)]
pub struct Win32ComboHost {
    subwindows: ComboSubwindows,
}

/// Holds `LockWindowUpdate` on the combobox; released on drop.
#[derive(Debug)]
pub struct WindowUpdateLock {
    hwnd: HWND,
}

impl Drop for WindowUpdateLock {
    fn drop(&mut self) {
        log::trace!("ComboBoxHandler: resuming repaint for {:?}", self.hwnd);
        let _ = unsafe { LockWindowUpdate(None) };
    }
}

impl Win32ComboHost {
    fn send(&self, msg: u32, wparam: usize, lparam: isize) -> isize {
        unsafe {
            SendMessageW(
                self.subwindows.combo,
                msg,
                Some(WPARAM(wparam)),
                Some(LPARAM(lparam)),
            )
            .0
        }
    }

    // Edit selection in UTF-16 units, as the native control reports it.
    fn edit_selection_units(&self) -> (usize, usize) {
        let mut start: u32 = 0;
        let mut end: u32 = 0;
        self.send(
            CB_GETEDITSEL,
            &mut start as *mut u32 as usize,
            &mut end as *mut u32 as isize,
        );
        (start as usize, end.max(start) as usize)
    }
}

impl ItemList for Win32ComboHost {
    fn item_count(&self) -> usize {
        index_from_raw(self.send(CB_GETCOUNT, 0, 0)).unwrap_or(0)
    }

    fn item_text(&self, index: usize) -> Option<String> {
        let len = index_from_raw(self.send(CB_GETLBTEXTLEN, index, 0))?;
        let mut buffer = vec![0u16; len + 1];
        let copied = index_from_raw(self.send(CB_GETLBTEXT, index, buffer.as_mut_ptr() as isize))?;
        buffer.truncate(copied.min(len));
        Some(String::from_utf16_lossy(&buffer))
    }
}

impl ComboHost for Win32ComboHost {
    type RepaintLock = WindowUpdateLock;

    fn is_dropped_down(&self) -> bool {
        self.send(CB_GETDROPPEDSTATE, 0, 0) != 0
    }

    fn selected_index(&self) -> Option<usize> {
        index_from_raw(self.send(CB_GETCURSEL, 0, 0))
    }

    fn set_selected_index(&self, index: Option<usize>) -> PlatformResult<()> {
        let wparam = index.map(|i| i as isize).unwrap_or(-1);
        let result = self.send(CB_SETCURSEL, wparam as usize, 0);
        if result == CB_ERR && index.is_some() {
            log::warn!("ComboBoxHandler: CB_SETCURSEL returned CB_ERR for index {index:?}");
            return Err(PlatformError::OperationFailed(format!(
                "CB_SETCURSEL rejected index {index:?}"
            )));
        }
        Ok(())
    }

    fn text(&self) -> String {
        read_window_text(self.subwindows.combo).unwrap_or_else(|err| {
            log::warn!("ComboBoxHandler: reading combobox text failed: {err}");
            String::new()
        })
    }

    fn set_text(&self, text: &str) -> PlatformResult<()> {
        unsafe { SetWindowTextW(self.subwindows.combo, &HSTRING::from(text))? };
        Ok(())
    }

    fn selection_start(&self) -> usize {
        let (start, _) = self.edit_selection_units();
        utf16_to_char_offset(&self.text(), start)
    }

    fn selection_length(&self) -> usize {
        let (start, end) = self.edit_selection_units();
        let text = self.text();
        utf16_to_char_offset(&text, end) - utf16_to_char_offset(&text, start)
    }

    fn set_selection(&self, start: usize, length: usize) -> PlatformResult<()> {
        let text = self.text();
        let start_units = char_to_utf16_offset(&text, start);
        let end_units = char_to_utf16_offset(&text, start + length);
        let clamp = |units: usize| units.min(u16::MAX as usize) as u16;
        let result = self.send(
            CB_SETEDITSEL,
            0,
            make_lparam(clamp(start_units), clamp(end_units)).0,
        );
        if result == CB_ERR {
            return Err(PlatformError::OperationFailed(
                "CB_SETEDITSEL failed (combobox has no edit control?)".into(),
            ));
        }
        Ok(())
    }

    fn select_all(&self) -> PlatformResult<()> {
        // An end position of -1 selects through the end of the text.
        let result = self.send(CB_SETEDITSEL, 0, make_lparam(0, u16::MAX).0);
        if result == CB_ERR {
            return Err(PlatformError::OperationFailed("CB_SETEDITSEL(0, -1) failed".into()));
        }
        Ok(())
    }

    fn suspend_repaint(&self) -> WindowUpdateLock {
        let hwnd = self.subwindows.combo;
        if !unsafe { LockWindowUpdate(Some(hwnd)) }.as_bool() {
            log::debug!("ComboBoxHandler: LockWindowUpdate({hwnd:?}) refused, another window holds it");
        }
        WindowUpdateLock { hwnd }
    }

    fn request_idle_turn(&self) {
        let posted = unsafe {
            PostMessageW(
                Some(self.subwindows.edit),
                WM_APP_RUN_IDLE_TURN,
                WPARAM(0),
                LPARAM(0),
            )
        };
        if let Err(err) = posted {
            log::error!("ComboBoxHandler: failed to post idle turn to edit sub-window: {err:?}");
        }
    }
}

/*
 * A native combobox with the autocomplete core attached to its edit and list
 * sub-windows. The interceptors detach themselves when the sub-windows are
 * destroyed; the parent window must forward its WM_COMMAND notifications
 * through `handle_parent_command`.
 */
pub struct AutocompleteComboBox {
    combo: Rc<AutocompleteCombo<Win32ComboHost>>,
    edit: InterceptorHandle,
    list: InterceptorHandle,
}

impl AutocompleteComboBox {
    /*
     * Attaches autocomplete to an existing editable combobox. Fails hard when
     * the sub-windows cannot be resolved or subclassed.
     */
    pub fn attach(hwnd_combo: HWND, config: AutocompleteConfig) -> PlatformResult<Self> {
        let subwindows = resolve_combo_subwindows(hwnd_combo)?;
        let combo = Rc::new(AutocompleteCombo::new(Win32ComboHost { subwindows }, config));

        let mut edit = edit_interceptor(&combo)?;
        let weak = Rc::downgrade(&combo);
        edit.register(WM_APP_RUN_IDLE_TURN, move |envelope| {
            envelope.cancel = true;
            if let Some(combo) = weak.upgrade() {
                combo.run_idle_turn();
            }
        })?;
        let list = list_interceptor(&combo)?;

        let edit = subclass::attach(subwindows.edit, edit)?;
        let list = subclass::attach(subwindows.list, list)?;

        log::debug!("ComboBoxHandler: autocomplete attached to combobox {hwnd_combo:?}");
        Ok(Self { combo, edit, list })
    }

    pub fn hwnd(&self) -> HWND {
        self.combo.host().subwindows.combo
    }

    /// Index of the item committed as the case-sensitive match, if any.
    pub fn committed_match(&self) -> Option<usize> {
        self.combo.committed_match()
    }

    pub fn is_attached(&self) -> bool {
        self.edit.is_attached() && self.list.is_attached()
    }

    /*
     * Replaces the items of the combobox. The committed match is dropped
     * first and re-established by the next edit; no implicit selection is made.
     */
    pub fn set_items(&self, items: &[String]) -> PlatformResult<()> {
        self.combo.reset_match();
        replace_items(self.hwnd(), items)
    }

    /*
     * Handles a WM_COMMAND received by the combobox's parent. Returns true if
     * the notification came from this combobox and was consumed.
     */
    pub fn handle_parent_command(&self, wparam: WPARAM, lparam: LPARAM) -> bool {
        let source = HWND(lparam.0 as *mut std::ffi::c_void);
        if source != self.hwnd() || !self.is_attached() {
            return false;
        }

        match highord_from_wparam(wparam) {
            CBN_EDITCHANGE => {
                log::trace!("ComboBoxHandler: CBN_EDITCHANGE for {source:?}");
                self.combo.on_text_changed();
                true
            }
            CBN_SELCHANGE => {
                let selected_index = self.combo.host().selected_index();
                log::debug!("ComboBoxHandler: CBN_SELCHANGE for {source:?}, selected index: {selected_index:?}");
                self.combo.on_selection_committed(selected_index);
                true
            }
            _ => false,
        }
    }
}

/*
 * Creates a native editable combobox under `hwnd_parent` and attaches the
 * autocomplete core to it. The native window is destroyed again if the
 * attach fails.
 */
pub fn create_autocomplete_combobox(
    hwnd_parent: HWND,
    control_id: i32,
    h_instance: Option<HINSTANCE>,
    config: AutocompleteConfig,
) -> PlatformResult<AutocompleteComboBox> {
    log::debug!("ComboBoxHandler: creating autocomplete combobox {control_id} under {hwnd_parent:?}");
    if hwnd_parent.is_invalid() {
        return Err(PlatformError::InvalidHandle(format!(
            "Parent HWND for combobox {control_id} is invalid"
        )));
    }

    let hwnd_combo = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            WC_COMBOBOX,
            &HSTRING::new(),
            WS_CHILD
                | WS_VISIBLE
                | WS_TABSTOP
                | WS_VSCROLL
                | WINDOW_STYLE(CBS_DROPDOWN | CBS_AUTOHSCROLL | CBS_HASSTRINGS),
            0,
            0,
            10,
            200, // Height for dropdown list
            Some(hwnd_parent),
            Some(HMENU(control_id as isize as *mut _)),
            h_instance,
            None,
        )?
    };

    match AutocompleteComboBox::attach(hwnd_combo, config) {
        Ok(combo) => Ok(combo),
        Err(err) => {
            log::error!("ComboBoxHandler: attaching autocomplete failed, destroying {hwnd_combo:?}: {err}");
            let _ = unsafe { DestroyWindow(hwnd_combo) };
            Err(err)
        }
    }
}

fn replace_items(hwnd_combo: HWND, items: &[String]) -> PlatformResult<()> {
    if hwnd_combo.is_invalid() {
        return Err(PlatformError::InvalidHandle(
            "Combobox HWND is null in replace_items".into(),
        ));
    }
    log::debug!("ComboBoxHandler: setting {} items on {hwnd_combo:?}", items.len());

    unsafe {
        SendMessageW(hwnd_combo, CB_RESETCONTENT, Some(WPARAM(0)), Some(LPARAM(0)));
    }
    for item in items {
        let h_item = HSTRING::from(item.as_str());
        unsafe {
            SendMessageW(
                hwnd_combo,
                CB_ADDSTRING,
                Some(WPARAM(0)),
                Some(LPARAM(h_item.as_ptr() as isize)),
            );
        }
    }
    Ok(())
}
