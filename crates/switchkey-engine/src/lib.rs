//! SwitchKey engine
//!
//! The engine crate owns the interception side of SwitchKey:
//! - a global CGEvent tap that watches `KeyDown` and `FlagsChanged` events
//! - live tracking of the right Command key (the switch modifier), which
//!   macOS only distinguishes from the left one in device-dependent flag bits
//! - the per-key candidate registry and cycle cursors
//! - the asynchronous handoff to the [`Activator`] that foregrounds apps
//!
//! This crate is macOS-only by design. The public surface is [`Switcher`]:
//! construct one, feed it mappings via [`Switcher::update_app_mappings`], and
//! control interception with [`Switcher::start`] / [`Switcher::stop`].
//!
//! Everything on the event-classification path is infallible and
//! non-blocking: decisions (including the cycle-cursor write) complete
//! synchronously inside the tap callback, and only the activation request
//! crosses to the async side. A later press therefore never waits on an
//! earlier activation, and rapid repeated presses cycle deterministically no
//! matter how slow app launches are.
//!
//! Known limitation: when a secure input context is focused (password
//! fields and the like), the OS withholds keyboard events from taps
//! entirely. There is nothing to observe or report; trigger presses simply
//! do not arrive until secure input ends.

use std::{collections::HashMap, sync::Arc, thread};

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

mod cycle;
mod dispatch;
mod error;
mod policy;
mod sys;

pub use error::{Error, Result};
pub use mac_activate::{Activator, AppId, WorkspaceActivator};
pub use mac_keypos::KeyPos;

/// Mapping from trigger key position to its ordered candidate list.
///
/// Order is significant: it defines the cycling order. A pinned key is
/// simply a one-element list, which disables cycling by construction.
pub type AppMappings = HashMap<KeyPos, Vec<AppId>>;

/// State consulted and mutated by the tap callback.
///
/// One writer/reader context on the hot path (the tap thread); other threads
/// only ever take the lock to replace the registry wholesale, so in-flight
/// classifications always see a consistent snapshot.
#[derive(Default)]
struct Inner {
    /// Whether the switch modifier (right Command) is currently held.
    switch_held: bool,
    /// Trigger key position -> ordered candidates.
    registry: AppMappings,
    /// Last activated candidate per trigger key.
    cursors: cycle::CycleState,
}

impl Inner {
    /// Classify a key-down and, on a match, advance the cycle cursor and
    /// return the candidate to activate.
    ///
    /// The cursor write happens here, before the tap callback returns and
    /// strictly before the activation request can run.
    fn on_key_down(&mut self, key: KeyPos) -> Option<AppId> {
        let list = self.registry.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        match policy::classify(self.switch_held, list, self.cursors.get(key)) {
            policy::Decision::Forward => None,
            policy::Decision::Activate(idx) => {
                let target = list[idx].clone();
                self.cursors.set(key, target.clone());
                Some(target)
            }
        }
    }

    /// Swap the registry contents wholesale and prune stale cursors.
    fn replace_registry(&mut self, mut mapping: AppMappings) {
        mapping.retain(|_, list| !list.is_empty());
        self.registry = mapping;
        self.cursors.prune(&self.registry);
        debug!(keys = self.registry.len(), "registry_replaced");
    }
}

/// Shared handle cloned into the tap callback.
#[derive(Clone)]
struct CallbackCtx {
    /// Hot-path state; see [`Inner`].
    inner: Arc<Mutex<Inner>>,
    /// Activation requests, drained in order by the dispatcher.
    tx: UnboundedSender<AppId>,
}

/// Lifecycle bookkeeping for the tap thread.
#[derive(Default)]
struct Lifecycle {
    /// Whether interception is currently running.
    active: bool,
    /// Join handle for the `switchkey-tap` thread while active.
    tap_thread: Option<thread::JoinHandle<()>>,
}

/// The application switcher: global input interception plus cycling state.
///
/// Cloneable-by-reference via `Arc` at the call sites that need it; all
/// methods take `&self`.
pub struct Switcher {
    /// Context shared with the tap callback.
    ctx: CallbackCtx,
    /// Stop handle for the tap thread's run loop.
    ctrl: Arc<sys::SysControl>,
    /// Start/stop state.
    lifecycle: Mutex<Lifecycle>,
}

impl Switcher {
    /// Create a switcher that hands selected candidates to `activator`.
    ///
    /// Spawns the activation dispatcher, so this must be called within a
    /// tokio runtime. Interception does not begin until [`Self::start`].
    pub fn new(activator: Arc<dyn Activator>) -> Self {
        Self {
            ctx: CallbackCtx {
                inner: Arc::new(Mutex::new(Inner::default())),
                tx: dispatch::spawn(activator),
            },
            ctrl: Arc::new(sys::SysControl::new()),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Begin interception. No-op when already active.
    ///
    /// Fails with [`Error::PermissionDenied`] while Input Monitoring is not
    /// granted; the caller is expected to retry (e.g. on a polling timer)
    /// once the user has acted. Fails with [`Error::EventTapStart`] if the
    /// OS refuses the tap despite permission.
    pub fn start(&self) -> Result<()> {
        let mut lc = self.lifecycle.lock();
        if lc.active {
            debug!("start_ignored_already_active");
            return Ok(());
        }

        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let ctx = self.ctx.clone();
        let ctrl = self.ctrl.clone();
        let handle = thread::Builder::new()
            .name("switchkey-tap".into())
            .spawn(move || {
                if let Err(err) = sys::run_event_loop(ctx, ready_tx, ctrl) {
                    warn!(error = %err, "event_tap_thread_exited_with_error");
                }
            })
            .map_err(|e| Error::OsError(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                lc.active = true;
                lc.tap_thread = Some(handle);
                info!("interception_started");
                Ok(())
            }
            Ok(Err(err)) => {
                let _ = handle.join();
                Err(err)
            }
            Err(_) => {
                let _ = handle.join();
                Err(Error::EventTapStart)
            }
        }
    }

    /// Cease interception, release the tap, and clear the tracked modifier
    /// state. Idempotent.
    pub fn stop(&self) {
        let mut lc = self.lifecycle.lock();
        if !lc.active {
            return;
        }
        self.ctrl.stop();
        if let Some(handle) = lc.tap_thread.take()
            && handle.join().is_err()
        {
            warn!("tap_thread_panicked");
        }
        lc.active = false;
        self.ctx.inner.lock().switch_held = false;
        info!("interception_stopped");
    }

    /// Whether interception is currently running.
    pub fn is_active(&self) -> bool {
        self.lifecycle.lock().active
    }

    /// Replace the trigger mappings wholesale.
    ///
    /// Safe to call from any thread at any time, including while the tap is
    /// live: the swap is atomic from the callback's point of view, and cycle
    /// cursors referencing removed candidates are pruned together with it.
    /// Keys mapped to an empty list are removed outright.
    pub fn update_app_mappings(&self, mapping: AppMappings) {
        self.ctx.inner.lock().replace_registry(mapping);
    }
}

impl Drop for Switcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use mac_keypos::modifiers::{
        DEVICE_LEFT_COMMAND, DEVICE_RIGHT_COMMAND, MASK_COMMAND,
    };
    use proptest::prelude::*;

    use super::*;

    fn app(id: &str) -> AppId {
        AppId::from(id)
    }

    fn inner_with(entries: &[(KeyPos, &[&str])]) -> Inner {
        let mut inner = Inner::default();
        inner.replace_registry(
            entries
                .iter()
                .map(|(k, ids)| (*k, ids.iter().map(|id| app(id)).collect()))
                .collect(),
        );
        inner.switch_held = true;
        inner
    }

    #[test]
    fn presses_cycle_through_candidates_and_wrap() {
        let mut inner = inner_with(&[(KeyPos::C, &["com.chrome", "com.calendar"])]);
        assert_eq!(inner.on_key_down(KeyPos::C), Some(app("com.chrome")));
        assert_eq!(inner.on_key_down(KeyPos::C), Some(app("com.calendar")));
        assert_eq!(inner.on_key_down(KeyPos::C), Some(app("com.chrome")));
    }

    #[test]
    fn refresh_that_removes_cursor_target_restarts_at_first() {
        let mut inner = inner_with(&[(KeyPos::C, &["com.chrome", "com.calendar"])]);
        assert_eq!(inner.on_key_down(KeyPos::C), Some(app("com.chrome")));
        assert_eq!(inner.on_key_down(KeyPos::C), Some(app("com.calendar")));
        // Calendar quit; the enumerator republishes without it.
        inner.replace_registry(HashMap::from([(
            KeyPos::C,
            vec![app("com.chrome")],
        )]));
        assert_eq!(inner.on_key_down(KeyPos::C), Some(app("com.chrome")));
    }

    #[test]
    fn pinned_key_always_activates_its_sole_candidate() {
        let mut inner = inner_with(&[(KeyPos::C, &["com.calendar"])]);
        for _ in 0..4 {
            assert_eq!(inner.on_key_down(KeyPos::C), Some(app("com.calendar")));
        }
    }

    #[test]
    fn modifier_up_or_unmapped_key_forwards_without_state_change() {
        let mut inner = inner_with(&[(KeyPos::C, &["com.chrome"])]);
        inner.switch_held = false;
        assert_eq!(inner.on_key_down(KeyPos::C), None);
        assert_eq!(inner.cursors.len(), 0);

        inner.switch_held = true;
        assert_eq!(inner.on_key_down(KeyPos::X), None);
        assert_eq!(inner.cursors.len(), 0);
    }

    #[test]
    fn empty_list_in_replacement_removes_key_and_cursor() {
        let mut inner = inner_with(&[(KeyPos::C, &["com.chrome"])]);
        assert_eq!(inner.on_key_down(KeyPos::C), Some(app("com.chrome")));
        inner.replace_registry(HashMap::from([(KeyPos::C, vec![])]));
        assert!(inner.registry.is_empty());
        assert_eq!(inner.cursors.len(), 0);
        assert_eq!(inner.on_key_down(KeyPos::C), None);
    }

    #[test]
    fn flags_updates_track_the_right_command_bit() {
        let mut inner = Inner::default();
        inner.switch_held =
            mac_keypos::modifiers::right_command_held(MASK_COMMAND | DEVICE_LEFT_COMMAND);
        assert!(!inner.switch_held);
        inner.switch_held =
            mac_keypos::modifiers::right_command_held(MASK_COMMAND | DEVICE_RIGHT_COMMAND);
        assert!(inner.switch_held);
        // Both held: behaves as right-held.
        inner.switch_held = mac_keypos::modifiers::right_command_held(
            MASK_COMMAND | DEVICE_LEFT_COMMAND | DEVICE_RIGHT_COMMAND,
        );
        assert!(inner.switch_held);
    }

    #[tokio::test]
    async fn switcher_starts_inactive_and_accepts_mappings() {
        let switcher = Switcher::new(Arc::new(mac_activate::MockActivator::new()));
        assert!(!switcher.is_active());
        switcher.update_app_mappings(HashMap::from([(
            KeyPos::S,
            vec![app("com.apple.Safari")],
        )]));
        // Stopping without starting is a no-op.
        switcher.stop();
        assert!(!switcher.is_active());
    }

    proptest! {
        // For any list length and press count, the activation sequence is
        // 0, 1 mod n, 2 mod n, ... with no dependence on activation timing.
        #[test]
        fn cycling_is_deterministic(n in 1usize..6, presses in 1usize..24) {
            let ids: Vec<AppId> =
                (0..n).map(|i| app(&format!("com.test.app{i}"))).collect();
            let mut inner = Inner::default();
            inner.replace_registry(HashMap::from([(KeyPos::K, ids.clone())]));
            inner.switch_held = true;
            for press in 0..presses {
                let got = inner.on_key_down(KeyPos::K);
                prop_assert_eq!(got.as_ref(), Some(&ids[press % n]));
            }
        }
    }
}
