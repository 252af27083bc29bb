/*
 * Observer-with-veto over a native sub-window's message stream.
 *
 * A `MessageInterceptor` holds a hook table keyed by message code with at most
 * one observer per code. Every delivered message is wrapped in a
 * `MessageEnvelope`, offered to the observer for its code, and the returned
 * `Disposition` tells the native side whether to suppress or forward it.
 * The table is frozen once attached, so dispatch only needs `&self` and stays
 * safe when an observer triggers nested messages on the same sub-window.
 */

use crate::error::{PlatformError, Result as PlatformResult};
use crate::types::{Disposition, MessageEnvelope, MessagePayload, message_name};

use std::collections::HashMap;

type Hook = Box<dyn Fn(&mut MessageEnvelope)>;

pub struct MessageInterceptor {
    label: &'static str,
    hooks: HashMap<u32, Hook>,
    trace_messages: bool,
}

impl MessageInterceptor {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            hooks: HashMap::new(),
            trace_messages: false,
        }
    }

    pub fn with_trace(mut self, trace_messages: bool) -> Self {
        self.trace_messages = trace_messages;
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /*
     * Registers the single observer for `code`. A second registration for the
     * same code is rejected rather than silently replacing the first.
     */
    pub fn register<F>(&mut self, code: u32, hook: F) -> PlatformResult<()>
    where
        F: Fn(&mut MessageEnvelope) + 'static,
    {
        if self.hooks.contains_key(&code) {
            log::warn!(
                "Interceptor[{}]: hook for 0x{code:04X} already registered",
                self.label
            );
            return Err(PlatformError::HookAlreadyRegistered(code));
        }
        self.hooks.insert(code, Box::new(hook));
        Ok(())
    }

    pub fn observes(&self, code: u32) -> bool {
        self.hooks.contains_key(&code)
    }

    pub fn dispatch(&self, code: u32, payload: MessagePayload) -> Disposition {
        let mut envelope = MessageEnvelope::new(code, payload);
        self.dispatch_envelope(&mut envelope)
    }

    pub fn dispatch_envelope(&self, envelope: &mut MessageEnvelope) -> Disposition {
        match self.hooks.get(&envelope.code) {
            Some(hook) => hook(envelope),
            None => {
                if self.trace_messages {
                    log::trace!(
                        "Interceptor[{}]: pass-through {} (0x{:04X})",
                        self.label,
                        message_name(envelope.code).unwrap_or("?"),
                        envelope.code
                    );
                }
                return Disposition::Forward;
            }
        }

        if envelope.cancel {
            log::debug!(
                "Interceptor[{}]: suppressed {} (0x{:04X})",
                self.label,
                message_name(envelope.code).unwrap_or("?"),
                envelope.code
            );
            Disposition::Suppressed
        } else {
            Disposition::Forward
        }
    }
}

impl std::fmt::Debug for MessageInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut codes: Vec<_> = self.hooks.keys().copied().collect();
        codes.sort_unstable();
        f.debug_struct("MessageInterceptor")
            .field("label", &self.label)
            .field("codes", &codes)
            .field("trace_messages", &self.trace_messages)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LB_SETTOPINDEX, WM_SETTEXT};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn unobserved_codes_are_forwarded() {
        let interceptor = MessageInterceptor::new("edit").with_trace(true);
        let result = interceptor.dispatch(0x0090, MessagePayload::Raw { wparam: 0, lparam: 0 });
        assert_eq!(result, Disposition::Forward);
    }

    #[test]
    fn observer_can_veto_its_message() {
        let mut interceptor = MessageInterceptor::new("list");
        interceptor
            .register(LB_SETTOPINDEX, |env| env.cancel = true)
            .unwrap();
        assert_eq!(
            interceptor.dispatch(LB_SETTOPINDEX, MessagePayload::Row(3)),
            Disposition::Suppressed
        );
    }

    #[test]
    fn observer_that_does_not_cancel_lets_message_through() {
        let seen = Rc::new(Cell::new(0));
        let mut interceptor = MessageInterceptor::new("edit");
        let seen_in_hook = seen.clone();
        interceptor
            .register(WM_SETTEXT, move |env| {
                assert_eq!(env.text(), Some("Alpha"));
                seen_in_hook.set(seen_in_hook.get() + 1);
            })
            .unwrap();

        let result = interceptor.dispatch(WM_SETTEXT, MessagePayload::Text(Some("Alpha".into())));
        assert_eq!(result, Disposition::Forward);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn second_observer_for_same_code_is_rejected() {
        let mut interceptor = MessageInterceptor::new("edit");
        interceptor.register(WM_SETTEXT, |_| {}).unwrap();
        let err = interceptor.register(WM_SETTEXT, |_| {}).unwrap_err();
        assert!(matches!(err, PlatformError::HookAlreadyRegistered(WM_SETTEXT)));
        assert!(interceptor.observes(WM_SETTEXT));
        assert!(!interceptor.observes(LB_SETTOPINDEX));
    }

    #[test]
    fn cancel_applies_to_a_single_message_only() {
        let veto = Rc::new(Cell::new(true));
        let mut interceptor = MessageInterceptor::new("list");
        let veto_in_hook = veto.clone();
        interceptor
            .register(LB_SETTOPINDEX, move |env| env.cancel = veto_in_hook.get())
            .unwrap();

        assert_eq!(
            interceptor.dispatch(LB_SETTOPINDEX, MessagePayload::Row(0)),
            Disposition::Suppressed
        );
        veto.set(false);
        assert_eq!(
            interceptor.dispatch(LB_SETTOPINDEX, MessagePayload::Row(0)),
            Disposition::Forward
        );
    }
}
