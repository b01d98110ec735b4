//! macOS event tap (CoreGraphics) integration for switch-key interception.
//!
//! Why we use `core-graphics` for event taps:
//! - Some wrappers expose a Rust callback like `FnMut(..) -> Option<CGEvent>`,
//!   where returning `None` is meant to “swallow” the event. If the wrapper maps
//!   `None` to the original `CGEventRef` (instead of a NULL), the OS still delivers
//!   the keystroke. CoreGraphics only suppresses delivery if the tap returns NULL.
//! - The `core-graphics` crate’s `CGEventTap` uses a `CallbackResult` where `Drop`
//!   maps to a NULL `CGEventRef` at the C boundary, matching CoreGraphics’ contract.
//!   We return `CallbackResult::Drop` for consumed trigger presses so they never
//!   reach the foreground app.
//!
//! The callback runs on the dedicated tap thread with a hard latency budget:
//! classification takes one uncontended lock, does map lookups, and returns.
//! Anything slow (the activation itself) leaves through the dispatch channel.

use std::{
    ffi::c_void,
    sync::{
        Arc,
        atomic::{AtomicPtr, Ordering},
    },
};

use core_foundation::{
    base::TCFType,
    mach_port::CFMachPortRef,
    runloop::{CFRunLoop, kCFRunLoopCommonModes},
};
use core_graphics::event::{self as cge, CallbackResult};
use crossbeam_channel::Sender;
use mac_keypos::{KeyPos, modifiers};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::CallbackCtx;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
}

/// `kCGKeyboardEventKeycode`: the hardware virtual keycode field.
const FIELD_KEYBOARD_EVENT_KEYCODE: u32 = 9;

// Shared control handle to stop the run loop from other threads.
pub(crate) struct SysControl {
    rl: Mutex<Option<CFRunLoop>>,
}

impl SysControl {
    pub(crate) fn new() -> Self {
        Self {
            rl: Mutex::new(None),
        }
    }

    pub(crate) fn set_rl(&self, rl: CFRunLoop) {
        let mut g = self.rl.lock();
        *g = Some(rl);
    }

    pub(crate) fn stop(&self) {
        let mut g = self.rl.lock();
        if let Some(rl) = g.take() {
            rl.stop();
        }
    }
}

/// Install the event tap and run this thread's CFRunLoop until stopped.
///
/// Readiness (or the reason the tap could not start) is reported once over
/// `ready` before the loop begins.
pub(crate) fn run_event_loop(
    cb_ctx: CallbackCtx,
    ready: Sender<crate::Result<()>>,
    ctrl: Arc<SysControl>,
) -> crate::Result<()> {
    // Preflight Input Monitoring permission.
    if !permissions::input_monitoring_ok() {
        warn!("input_monitoring_permission_missing");
        let _ = ready.send(Err(crate::Error::PermissionDenied("Input Monitoring")));
        return Err(crate::Error::PermissionDenied("Input Monitoring"));
    }

    // Capture for re-enabling the tap from inside the closure.
    let tap_port_ptr: Arc<AtomicPtr<c_void>> = Arc::new(AtomicPtr::new(std::ptr::null_mut()));

    debug!("creating_event_tap");
    let tap_port_ptr_cb = tap_port_ptr.clone();
    let cb_ctx_cb = cb_ctx.clone();
    let tap = match cge::CGEventTap::new(
        cge::CGEventTapLocation::HID,
        cge::CGEventTapPlacement::HeadInsertEventTap,
        cge::CGEventTapOptions::Default,
        vec![cge::CGEventType::KeyDown, cge::CGEventType::FlagsChanged],
        move |_proxy, etype, event| {
            match etype {
                // Handled before any classification: a suspended tap receives
                // no further input events until re-enabled.
                cge::CGEventType::TapDisabledByTimeout
                | cge::CGEventType::TapDisabledByUserInput => {
                    let p = tap_port_ptr_cb.load(Ordering::SeqCst) as CFMachPortRef;
                    if !p.is_null() {
                        warn!("tap_disabled_by_os_reenabling");
                        unsafe { CGEventTapEnable(p, true) };
                    }
                    CallbackResult::Keep
                }
                // Modifier events are never consumed; eating one would
                // desynchronize modifier bookkeeping for every other app.
                cge::CGEventType::FlagsChanged => {
                    let flags = event.get_flags().bits();
                    let held = modifiers::right_command_held(flags);
                    let mut inner = cb_ctx_cb.inner.lock();
                    if inner.switch_held != held {
                        trace!(held, "switch_modifier_changed");
                    }
                    inner.switch_held = held;
                    CallbackResult::Keep
                }
                cge::CGEventType::KeyDown => {
                    let keycode =
                        event.get_integer_value_field(FIELD_KEYBOARD_EVENT_KEYCODE) as u16;
                    let target = {
                        let mut inner = cb_ctx_cb.inner.lock();
                        if inner.switch_held {
                            KeyPos::from_scancode(keycode)
                                .and_then(|key| inner.on_key_down(key))
                        } else {
                            // Fast path: most keystrokes arrive with the
                            // switch modifier up.
                            None
                        }
                    };
                    match target {
                        Some(id) => {
                            trace!(scancode = keycode, app = %id, "intercepting_trigger_press");
                            if cb_ctx_cb.tx.send(id).is_err() {
                                // Dispatcher is gone (shutdown); swallowing
                                // the keystroke would have no visible effect.
                                warn!("activation_channel_closed_forwarding_event");
                                return CallbackResult::Keep;
                            }
                            CallbackResult::Drop
                        }
                        None => CallbackResult::Keep,
                    }
                }
                _ => CallbackResult::Keep,
            }
        },
    ) {
        Ok(t) => t,
        Err(_) => {
            warn!("event_tap_create_failed");
            let _ = ready.send(Err(crate::Error::EventTapStart));
            return Err(crate::Error::EventTapStart);
        }
    };

    // Share the CFMachPort for re-enabling inside the callback.
    tap_port_ptr.store(
        tap.mach_port().as_concrete_TypeRef() as *mut c_void,
        Ordering::SeqCst,
    );

    // Create a runloop source and start the tap on this thread's runloop.
    let source = match tap.mach_port().create_runloop_source(0) {
        Ok(s) => s,
        Err(_) => {
            warn!("run_loop_source_create_failed");
            let _ = ready.send(Err(crate::Error::EventTapStart));
            return Err(crate::Error::EventTapStart);
        }
    };

    let rl = CFRunLoop::get_current();
    ctrl.set_rl(rl.clone());
    let mode = unsafe { kCFRunLoopCommonModes };
    rl.add_source(&source, mode);

    // Enable the tap and run the loop.
    tap.enable();

    let _ = ready.send(Ok(()));
    debug!("event_tap_started_run_loop");

    CFRunLoop::run_current();

    debug!("event_tap_exited");
    Ok(())
}
