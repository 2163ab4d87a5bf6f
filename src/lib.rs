//! App Open ad lifecycle manager.
//!
//! Keeps one full-screen App Open ad preloaded, refreshes it when it
//! grows stale, and presents it when the app returns to the foreground,
//! no more often than the configured cooldown.  SDK access sits behind
//! the port traits in [`app::ports`]; the crate itself never blocks and
//! never touches an ad network directly.

#![deny(unused_must_use)]

// Links the std critical-section implementation used by the event queue.
extern crate critical_section;

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod inventory;
pub mod policy;
pub mod scheduler;
