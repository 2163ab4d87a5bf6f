//! Inbound commands to the lifecycle manager.
//!
//! These represent actions requested by the host shell (UI code, debug
//! menu, config reload) that the
//! [`AdLifecycleManager`](super::service::AdLifecycleManager) interprets.
//! Adapter outcomes do not come through here; they arrive on the
//! [`EventQueue`](crate::events::EventQueue).

use crate::app::ports::AppLifecycle;
use crate::config::AdConfig;

/// Commands the host can send into the ad core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Make sure an ad is cached or being fetched.
    EnsureLoaded,

    /// Show the cached ad if freshness and cooldown allow it.
    ShowIfEligible,

    /// Apply an app-state transition delivered out of band.
    Lifecycle(AppLifecycle),

    /// Hot-reload pacing configuration.  The slot and the last display
    /// time are kept.
    UpdateConfig(AdConfig),
}
