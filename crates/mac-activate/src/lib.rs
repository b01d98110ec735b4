//! Brings macOS applications to the foreground, launching them if needed.
//!
//! The [`Activator`] trait is the seam between the switching core and AppKit:
//! the core hands over an [`AppId`] (a bundle identifier) and does not care
//! how the foregrounding happens or how long it takes. [`WorkspaceActivator`]
//! is the production implementation: it activates the first running app with
//! that bundle identifier, or asks `NSWorkspace` to launch it.
//!
//! Activation failures are reported through [`Error`] and are expected to be
//! logged by the caller; nothing here retries.
#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

use std::fmt;

use async_trait::async_trait;
use objc2::rc::Retained;
use objc2_app_kit::{
    NSApplicationActivationOptions, NSRunningApplication, NSWorkspace,
    NSWorkspaceOpenConfiguration,
};
use objc2_foundation::NSString;
use tracing::{debug, info, warn};

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while resolving or activating an application.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The bundle identifier matches neither a running application nor an
    /// installed one.
    #[error("no application for bundle identifier {0}")]
    UnknownApp(AppId),
    /// AppKit refused the activation request for a running application.
    #[error("activation refused for {0}")]
    ActivationRefused(AppId),
}

/// Stable identifier for an activatable application: its bundle identifier
/// (e.g. `com.apple.Safari`).
///
/// Equality is identifier-based; display names play no role.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct AppId(String);

impl AppId {
    /// Wrap a bundle identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw bundle identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Performs the platform activation for a selected application.
///
/// Implementations may take arbitrarily long (a cold launch) and are invoked
/// off the input-dispatch path; they must be safe to call concurrently.
#[async_trait]
pub trait Activator: Send + Sync {
    /// Bring `id` to the foreground, launching it if it is not running.
    async fn activate(&self, id: &AppId) -> Result<()>;
}

/// Production [`Activator`] backed by `NSRunningApplication` / `NSWorkspace`.
///
/// Both classes are documented thread-safe, so activation may run on any
/// thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkspaceActivator;

impl WorkspaceActivator {
    /// Create a new workspace activator.
    pub fn new() -> Self {
        Self
    }
}

/// First running application whose bundle identifier matches.
fn first_running_app(bundle: &NSString) -> Option<Retained<NSRunningApplication>> {
    unsafe {
        let apps = NSRunningApplication::runningApplicationsWithBundleIdentifier(bundle);
        apps.firstObject()
    }
}

#[async_trait]
impl Activator for WorkspaceActivator {
    async fn activate(&self, id: &AppId) -> Result<()> {
        let bundle = NSString::from_str(id.as_str());
        if let Some(app) = first_running_app(&bundle) {
            let ok = unsafe {
                app.activateWithOptions(NSApplicationActivationOptions::ActivateAllWindows)
            };
            if !ok {
                warn!(app = %id, "activate_with_options_refused");
                return Err(Error::ActivationRefused(id.clone()));
            }
            debug!(app = %id, "activated_running_app");
            return Ok(());
        }

        // Not running: resolve the application URL and ask the workspace to
        // launch it. The completion handler is omitted; launch problems
        // surface in the workspace's own logging and the next press simply
        // retries the same path.
        unsafe {
            let ws = NSWorkspace::sharedWorkspace();
            let Some(url) = ws.URLForApplicationWithBundleIdentifier(&bundle) else {
                return Err(Error::UnknownApp(id.clone()));
            };
            let config = NSWorkspaceOpenConfiguration::new();
            config.setActivates(true);
            ws.openApplicationAtURL_configuration_completionHandler(&url, &config, None);
        }
        info!(app = %id, "launch_requested");
        Ok(())
    }
}

/// Recording [`Activator`] for tests: remembers every id it was asked to
/// activate and fails for ids registered via [`MockActivator::fail_for`].
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct MockActivator {
    activated: parking_lot::Mutex<Vec<AppId>>,
    failing: parking_lot::Mutex<Vec<AppId>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockActivator {
    /// Create an activator that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent activations of `id` fail with [`Error::UnknownApp`].
    pub fn fail_for(&self, id: AppId) {
        self.failing.lock().push(id);
    }

    /// Ids activated so far, in dispatch order.
    pub fn activated(&self) -> Vec<AppId> {
        self.activated.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Activator for MockActivator {
    async fn activate(&self, id: &AppId) -> Result<()> {
        if self.failing.lock().contains(id) {
            return Err(Error::UnknownApp(id.clone()));
        }
        self.activated.lock().push(id.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_records_in_order() {
        let mock = MockActivator::new();
        mock.activate(&AppId::from("com.example.one"))
            .await
            .expect("accepted");
        mock.activate(&AppId::from("com.example.two"))
            .await
            .expect("accepted");
        assert_eq!(
            mock.activated(),
            vec![AppId::from("com.example.one"), AppId::from("com.example.two")]
        );
    }

    #[tokio::test]
    async fn mock_failures_are_reported_and_not_recorded() {
        let mock = MockActivator::new();
        let bad = AppId::from("com.example.missing");
        mock.fail_for(bad.clone());
        assert_eq!(mock.activate(&bad).await, Err(Error::UnknownApp(bad)));
        assert!(mock.activated().is_empty());
    }

    #[test]
    fn app_id_equality_is_identifier_based() {
        assert_eq!(AppId::from("com.a.b"), AppId::new(String::from("com.a.b")));
        assert_ne!(AppId::from("com.a.b"), AppId::from("com.a.c"));
        assert_eq!(AppId::from("com.a.b").to_string(), "com.a.b");
    }
}
