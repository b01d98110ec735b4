//! Simple, macOS-only permission checks for SwitchKey.
//!
//! Intercepting keystrokes with a CGEvent tap requires the Input Monitoring
//! permission; activating other applications additionally benefits from
//! Accessibility. This crate exposes a minimal, stable API to query both and
//! to fire the one-shot Input Monitoring system prompt. Guiding the user to
//! System Settings beyond that prompt is the host's responsibility.
//!
//! The query calls are fast and side-effect free; only
//! [`request_input_monitoring`] has a visible effect (the system dialog, at
//! most once per app registration).

use serde::Serialize;

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn CGPreflightListenEventAccess() -> bool;
    fn CGRequestListenEventAccess() -> bool;
}

/// Check if the application has the global Accessibility permission.
pub fn accessibility_ok() -> bool {
    unsafe { AXIsProcessTrusted() }
}

/// Check if the application has the "Input Monitoring" permission.
///
/// Returns `true` when the process is allowed to listen for keyboard events
/// (CGEvent tap), and `false` otherwise. Performs no prompting.
pub fn input_monitoring_ok() -> bool {
    unsafe { CGPreflightListenEventAccess() }
}

/// Ask the OS to grant Input Monitoring, showing the system prompt if the
/// user has not decided yet.
///
/// Returns the resulting grant state. macOS shows the dialog at most once;
/// afterwards this behaves like [`input_monitoring_ok`].
pub fn request_input_monitoring() -> bool {
    unsafe { CGRequestListenEventAccess() }
}

/// Current permission status for the process.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PermissionsStatus {
    /// Input Monitoring permission; `true` if granted.
    pub input_ok: bool,
    /// Accessibility (AX) permission; `true` if granted.
    pub accessibility_ok: bool,
}

/// Query both Input Monitoring and Accessibility permissions.
///
/// This is a convenience wrapper over [`input_monitoring_ok`] and
/// [`accessibility_ok`]. The function performs no prompting and has no side
/// effects.
pub fn check_permissions() -> PermissionsStatus {
    PermissionsStatus {
        input_ok: input_monitoring_ok(),
        accessibility_ok: accessibility_ok(),
    }
}
