/*
 * Error type shared by the autocomplete core and its Win32 binding.
 * Only subwindow resolution is fatal; every other failure is logged by the
 * orchestrator and degrades to "no autocomplete this cycle".
 */

use std::fmt;

#[derive(Debug)]
pub enum PlatformError {
    /// The edit or list sub-window of a combobox could not be obtained.
    SubwindowResolution(String),
    /// A null or already destroyed native handle was supplied.
    InvalidHandle(String),
    /// A second observer was registered for a message code.
    HookAlreadyRegistered(u32),
    /// A host mutation (text, caret, selection) failed.
    OperationFailed(String),
    #[cfg(target_os = "windows")]
    Win32(windows::core::Error),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubwindowResolution(msg) => {
                write!(f, "Failed to resolve combobox sub-windows: {msg}")
            }
            Self::InvalidHandle(msg) => write!(f, "Invalid handle: {msg}"),
            Self::HookAlreadyRegistered(code) => {
                write!(f, "A hook is already registered for message 0x{code:04X}")
            }
            Self::OperationFailed(msg) => write!(f, "Operation failed: {msg}"),
            #[cfg(target_os = "windows")]
            Self::Win32(err) => write!(f, "Win32 error: {err}"),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(target_os = "windows")]
            Self::Win32(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(target_os = "windows")]
impl From<windows::core::Error> for PlatformError {
    fn from(err: windows::core::Error) -> Self {
        Self::Win32(err)
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
