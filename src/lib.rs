/*
 * Case-sensitive, caret-preserving inline autocomplete for native combo boxes.
 *
 * The crate augments an existing combobox instead of replacing it: message
 * interceptors attached to the control's edit and list sub-windows give the
 * autocomplete core a veto over native text and scroll changes, while a small
 * state machine decides on every keystroke which item is the committed match.
 *
 * The core (matching, key tracking, interception, idle-turn scheduling) is
 * platform-agnostic and compiles and tests everywhere. The Win32 binding that
 * subclasses real sub-windows is only built on Windows.
 */
pub mod combo;
#[cfg(target_os = "windows")]
pub mod controls;
pub mod error;
#[cfg(test)]
pub(crate) mod fake_host;
pub mod idle_queue;
pub mod interceptor;
pub mod key_tracker;
pub mod matcher;
pub mod subwindows;
pub mod types;
#[cfg(target_os = "windows")]
pub(crate) mod window_common;

pub use combo::{AutocompleteCombo, ComboHost};
#[cfg(target_os = "windows")]
pub use controls::combobox_handler::{AutocompleteComboBox, Win32ComboHost};
pub use error::{PlatformError, Result as PlatformResult};
pub use interceptor::MessageInterceptor;
pub use matcher::{ItemList, MatchState};
pub use types::{AutocompleteConfig, Disposition, KeyCode, MessageEnvelope, MessagePayload};
