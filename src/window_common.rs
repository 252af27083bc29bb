/*
 * Common Win32 helpers for the combobox binding: resolving the native edit and
 * list sub-windows of a combobox, reading window text without truncation,
 * decoding message parameters, and the private application message used to
 * run deferred work on the next idle turn of the message loop.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::{MessagePayload, WM_SETTEXT};

use windows::Win32::{
    Foundation::{HWND, LPARAM, WPARAM},
    UI::Controls::{COMBOBOXINFO, GetComboBoxInfo},
    UI::WindowsAndMessaging::{GetWindowTextLengthW, GetWindowTextW, WM_APP},
};
use windows::core::PCWSTR;

// Posted to the edit sub-window; observed by its interceptor to run one idle turn.
pub(crate) const WM_APP_RUN_IDLE_TURN: u32 = WM_APP + 0x200;

/// Native handles of a combobox and its two sub-windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ComboSubwindows {
    pub combo: HWND,
    pub edit: HWND,
    pub list: HWND,
}

/*
 * Resolves the edit and list sub-windows of an editable combobox. Without
 * both handles the interceptors cannot attach, so any failure here is fatal
 * for the control's autocomplete.
 */
pub(crate) fn resolve_combo_subwindows(hwnd_combo: HWND) -> PlatformResult<ComboSubwindows> {
    if hwnd_combo.is_invalid() {
        return Err(PlatformError::InvalidHandle(
            "Combobox HWND is null".to_string(),
        ));
    }

    let mut info = COMBOBOXINFO {
        cbSize: std::mem::size_of::<COMBOBOXINFO>() as u32,
        ..Default::default()
    };
    if let Err(err) = unsafe { GetComboBoxInfo(hwnd_combo, &mut info) } {
        log::error!("WindowCommon: GetComboBoxInfo failed for {hwnd_combo:?}: {err:?}");
        return Err(PlatformError::SubwindowResolution(format!(
            "GetComboBoxInfo failed for {hwnd_combo:?}: {err}"
        )));
    }

    subwindows_from_info(hwnd_combo, info.hwndItem, info.hwndList)
}

fn subwindows_from_info(combo: HWND, edit: HWND, list: HWND) -> PlatformResult<ComboSubwindows> {
    if edit.is_invalid() {
        return Err(PlatformError::SubwindowResolution(format!(
            "Combobox {combo:?} has no edit sub-window (not CBS_DROPDOWN?)"
        )));
    }
    if list.is_invalid() {
        return Err(PlatformError::SubwindowResolution(format!(
            "Combobox {combo:?} has no list sub-window"
        )));
    }
    log::debug!("WindowCommon: combobox {combo:?} edit {edit:?} list {list:?}");
    Ok(ComboSubwindows { combo, edit, list })
}

#[inline]
pub(crate) fn highord_from_wparam(wparam: WPARAM) -> i32 {
    ((wparam.0 >> 16) & 0xFFFF) as i32
}
#[inline]
pub(crate) fn make_lparam(low: u16, high: u16) -> LPARAM {
    LPARAM((((high as u32) << 16) | low as u32) as isize)
}

/*
 * Decodes the parameters of a message delivered to a sub-window into the
 * payload the interceptors inspect. A null or unreadable WM_SETTEXT pointer
 * becomes "no text" rather than an error.
 */
pub(crate) fn decode_payload(msg: u32, wparam: WPARAM, lparam: LPARAM) -> MessagePayload {
    match msg {
        WM_SETTEXT => {
            let ptr = PCWSTR(lparam.0 as *const u16);
            if ptr.is_null() {
                return MessagePayload::Text(None);
            }
            MessagePayload::Text(unsafe { ptr.to_string() }.ok())
        }
        crate::types::LB_SETTOPINDEX => MessagePayload::Row(wparam.0),
        _ => MessagePayload::Raw {
            wparam: wparam.0,
            lparam: lparam.0,
        },
    }
}

// Reads the full text of a window without truncation.
pub(crate) fn read_window_text(hwnd: HWND) -> PlatformResult<String> {
    read_window_text_with(
        || unsafe { GetWindowTextLengthW(hwnd) },
        |buf| unsafe { GetWindowTextW(hwnd, buf) },
    )
}

// Internal helper that can be unit tested with injected getters.
fn read_window_text_with<FLen, FGet>(get_len: FLen, get_text: FGet) -> PlatformResult<String>
where
    FLen: Fn() -> i32,
    FGet: Fn(&mut [u16]) -> i32,
{
    let len = get_len();
    if len < 0 {
        return Err(PlatformError::OperationFailed(
            "GetWindowTextLengthW returned negative length".into(),
        ));
    }

    let mut buffer = vec![0u16; len as usize + 1];
    let copied = get_text(&mut buffer);
    if copied < 0 {
        return Err(PlatformError::OperationFailed(
            "GetWindowTextW returned negative length".into(),
        ));
    }

    buffer.truncate(copied as usize);
    Ok(String::from_utf16_lossy(&buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_window_text_with_handles_strings_longer_than_default_buffer() {
        let long_text = "Banana".repeat(200);
        let utf16: Vec<u16> = long_text.encode_utf16().collect();
        let len = utf16.len() as i32;

        let text = read_window_text_with(
            || len,
            |buf| {
                buf[..utf16.len()].copy_from_slice(&utf16);
                len
            },
        )
        .unwrap();
        assert_eq!(text, long_text);
    }

    #[test]
    fn read_window_text_with_rejects_negative_lengths() {
        assert!(read_window_text_with(|| -1, |_| 0).is_err());
    }

    #[test]
    fn missing_edit_subwindow_is_a_resolution_failure() {
        let combo = HWND(0x10 as *mut std::ffi::c_void);
        let list = HWND(0x30 as *mut std::ffi::c_void);
        let err = subwindows_from_info(combo, HWND::default(), list).unwrap_err();
        assert!(matches!(err, PlatformError::SubwindowResolution(_)));
    }

    #[test]
    fn null_settext_pointer_decodes_to_no_text() {
        let payload = decode_payload(WM_SETTEXT, WPARAM(0), LPARAM(0));
        assert_eq!(payload, MessagePayload::Text(None));
    }

    #[test]
    fn settext_pointer_decodes_to_text() {
        let wide: Vec<u16> = "Apple\0".encode_utf16().collect();
        let payload = decode_payload(WM_SETTEXT, WPARAM(0), LPARAM(wide.as_ptr() as isize));
        assert_eq!(payload, MessagePayload::Text(Some("Apple".into())));
    }

    #[test]
    fn word_helpers_split_and_join() {
        let wparam = WPARAM((5 << 16) | 1001);
        assert_eq!(wparam.0 & 0xFFFF, 1001);
        assert_eq!(highord_from_wparam(wparam), 5);
        assert_eq!(make_lparam(2, 7).0, (7 << 16) | 2);
    }
}
