//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the rules for the App Open ad slot: when to
//! fetch, when to show, freshness, cooldown, and foreground handling.
//! All interaction with the ad SDK and the OS happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without a real ad network.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
