/*
 * Attaches a `MessageInterceptor` to an existing native window through
 * comctl32 window subclassing. The interceptor is boxed and handed to the
 * subclass procedure as its reference data; it is detached and dropped when
 * the window receives WM_NCDESTROY, so it never outlives the handle.
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::interceptor::MessageInterceptor;
use crate::types::Disposition;
use crate::window_common::decode_payload;

use std::cell::Cell;
use std::rc::Rc;
use windows::Win32::{
    Foundation::{HWND, LPARAM, LRESULT, WPARAM},
    UI::{
        Shell::{DefSubclassProc, RemoveWindowSubclass, SetWindowSubclass},
        WindowsAndMessaging::WM_NCDESTROY,
    },
};

// Result returned for a vetoed message.
const HANDLED: LRESULT = LRESULT(1);
const INTERCEPTOR_SUBCLASS_ID: usize = 0x4143_4258;

struct SubclassData {
    interceptor: MessageInterceptor,
    attached: Rc<Cell<bool>>,
}

/// Observes whether an attached interceptor is still installed.
#[derive(Debug, Clone)]
pub struct InterceptorHandle {
    hwnd: HWND,
    label: &'static str,
    attached: Rc<Cell<bool>>,
}

impl InterceptorHandle {
    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// False once the native window has been destroyed.
    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }
}

pub(crate) fn attach(hwnd: HWND, interceptor: MessageInterceptor) -> PlatformResult<InterceptorHandle> {
    if hwnd.is_invalid() {
        return Err(PlatformError::InvalidHandle(format!(
            "Cannot attach '{}' interceptor to a null HWND",
            interceptor.label()
        )));
    }

    let label = interceptor.label();
    let attached = Rc::new(Cell::new(true));
    let data = Box::new(SubclassData {
        interceptor,
        attached: attached.clone(),
    });
    let raw = Box::into_raw(data);

    let ok = unsafe {
        SetWindowSubclass(
            hwnd,
            Some(interceptor_subclass_proc),
            INTERCEPTOR_SUBCLASS_ID,
            raw as usize,
        )
    };
    if !ok.as_bool() {
        let _ = unsafe { Box::from_raw(raw) };
        log::error!("Subclass: SetWindowSubclass failed for '{label}' on {hwnd:?}");
        return Err(PlatformError::OperationFailed(format!(
            "SetWindowSubclass failed for '{label}' interceptor on {hwnd:?}"
        )));
    }

    log::debug!("Subclass: attached '{label}' interceptor to {hwnd:?}");
    Ok(InterceptorHandle {
        hwnd,
        label,
        attached,
    })
}

/*
 * Offers every message to the interceptor first. A vetoed message returns
 * the "handled" sentinel without default processing; everything else goes
 * to the next procedure in the subclass chain.
 */
unsafe extern "system" fn interceptor_subclass_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    _subclass_id: usize,
    ref_data: usize,
) -> LRESULT {
    let data_ptr = ref_data as *mut SubclassData;
    if data_ptr.is_null() {
        return unsafe { DefSubclassProc(hwnd, msg, wparam, lparam) };
    }

    if msg == WM_NCDESTROY {
        unsafe {
            let _ = RemoveWindowSubclass(hwnd, Some(interceptor_subclass_proc), INTERCEPTOR_SUBCLASS_ID);
            let data = Box::from_raw(data_ptr);
            data.attached.set(false);
            log::debug!("Subclass: detached '{}' interceptor from {hwnd:?}", data.interceptor.label());
            return DefSubclassProc(hwnd, msg, wparam, lparam);
        }
    }

    let data = unsafe { &*data_ptr };
    let disposition = if data.interceptor.observes(msg) {
        data.interceptor.dispatch(msg, decode_payload(msg, wparam, lparam))
    } else {
        data.interceptor
            .dispatch(msg, crate::types::MessagePayload::Raw { wparam: wparam.0, lparam: lparam.0 })
    };

    match disposition {
        Disposition::Suppressed => HANDLED,
        Disposition::Forward => unsafe { DefSubclassProc(hwnd, msg, wparam, lparam) },
    }
}
