/*
 * Platform-agnostic types exchanged between the native message interceptors,
 * the key tracker, the matcher and the orchestrator. Nothing here touches
 * Win32 so the whole autocomplete core can be compiled and tested anywhere.
 */

/// Edit sub-window: proposed full text is about to be displayed.
pub const WM_SETTEXT: u32 = 0x000C;
/// List sub-window: the native list is about to scroll/auto-select a row.
pub const LB_SETTOPINDEX: u32 = 0x0189;
/// Edit sub-window: a key was pressed.
pub const WM_KEYDOWN: u32 = 0x0100;

const VK_BACK: u32 = 0x08;
const VK_RETURN: u32 = 0x0D;

/*
 * Symbolic names for the window messages the combobox sub-windows are known
 * to receive. Only used for trace logging of messages no hook observes.
 */
pub fn message_name(code: u32) -> Option<&'static str> {
    let name = match code {
        0x0002 => "WM_DESTROY",
        0x0003 => "WM_MOVE",
        0x0005 => "WM_SIZE",
        WM_SETTEXT => "WM_SETTEXT",
        0x0014 => "WM_ERASEBKGND",
        0x0018 => "WM_SHOWWINDOW",
        0x001C => "WM_ACTIVATEAPP",
        0x0022 => "WM_SETFONT",
        0x0046 => "WM_WINDOWPOSCHANGING",
        0x0047 => "WM_WINDOWPOSCHANGED",
        0x0082 => "WM_NCDESTROY",
        0x0083 => "WM_NCCREATE",
        0x0085 => "WM_NCPAINT",
        0x0090 => "WM_PAINT",
        0x00AF => "WM_NEXTDLGCTL",
        WM_KEYDOWN => "WM_KEYDOWN",
        0x014E => "CB_SETCURSEL",
        0x0186 => "LB_GETCOUNT",
        0x0188 => "LB_GETTEXT",
        LB_SETTOPINDEX => "LB_SETTOPINDEX",
        0x018A => "LB_GETTOPINDEX",
        0x018B => "LB_GETITEMRECT",
        0x018F => "LB_GETSELCOUNT",
        0x0197 => "LB_GETTEXTLEN",
        0x019E => "LB_GETCURSEL",
        0x01A1 => "WM_CHANGEUISTATE",
        0x01A2 => "WM_UPDATEUISTATE",
        0x01AE => "LB_GETLISTBOXINFO",
        0x01AF => "LB_SETCURSEL",
        0x0200 => "WM_MOUSEMOVE",
        0x0201 => "WM_LBUTTONDOWN",
        0x0202 => "WM_LBUTTONUP",
        0x0215 => "WM_CAPTURECHANGED",
        0x02A3 => "WM_NCMOUSEHOVER",
        0x0317 => "WM_DPICHANGED",
        0x0318 => "WM_GETDPISCALEDSIZE",
        _ => return None,
    };
    Some(name)
}

/// Key classes the autocomplete core distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// Commit/accept key (Enter).
    Enter,
    Backspace,
    /// Any other key, identified by its virtual-key code.
    Other(u32),
}

impl KeyCode {
    pub fn from_virtual_key(vk: u32) -> Self {
        match vk {
            VK_RETURN => KeyCode::Enter,
            VK_BACK => KeyCode::Backspace,
            other => KeyCode::Other(other),
        }
    }
}

/// Decoded message payload. Only the payloads the core inspects are decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    /// Proposed text; `None` when the native pointer was null or unreadable.
    Text(Option<String>),
    /// Row index carried by list messages.
    Row(usize),
    /// Undecoded parameters, passed through untouched.
    Raw { wparam: usize, lparam: isize },
}

/*
 * A single intercepted message. Observers set `cancel` to suppress default
 * processing of this one message.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEnvelope {
    pub code: u32,
    pub payload: MessagePayload,
    pub cancel: bool,
}

impl MessageEnvelope {
    pub fn new(code: u32, payload: MessagePayload) -> Self {
        Self {
            code,
            payload,
            cancel: false,
        }
    }

    /// Returns the proposed text, if this envelope carries a readable one.
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            MessagePayload::Text(Some(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Returns the requested row, if this envelope carries one.
    pub fn row(&self) -> Option<usize> {
        match self.payload {
            MessagePayload::Row(row) => Some(row),
            _ => None,
        }
    }
}

/// Outcome of dispatching an envelope through an interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// An observer vetoed the message; default processing must not run.
    Suppressed,
    /// Let default processing handle the message.
    Forward,
}

/// Tunables supplied when the autocomplete core is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteConfig {
    /// Log every message no hook observes, with its symbolic name.
    pub trace_messages: bool,
    /// Highlight the whole text on the idle turn after Enter.
    pub select_all_on_enter: bool,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            trace_messages: false,
            select_all_on_enter: true,
        }
    }
}

/// Returns the prefix of `text` made of its first `caret` chars.
pub fn prefix_to_caret(text: &str, caret: usize) -> &str {
    match text.char_indices().nth(caret) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Converts a char offset into UTF-16 code units, clamped to the text.
pub fn char_to_utf16_offset(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}

/// Converts a UTF-16 code-unit offset into a char offset, clamped to the text.
pub fn utf16_to_char_offset(text: &str, units: usize) -> usize {
    let mut consumed = 0;
    let mut chars = 0;
    for ch in text.chars() {
        if consumed >= units {
            break;
        }
        consumed += ch.len_utf16();
        chars += 1;
    }
    chars
}
