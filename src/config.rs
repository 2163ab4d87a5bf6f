//! Ad lifecycle configuration
//!
//! All tunable parameters for the App Open ad manager.
//! Defaults are the production contract; a JSON document can override any
//! subset of them.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// Production units live in `config/production.json`; the defaults below
// never bill real impressions.

/// Google's public App Open test unit.  Safe to ship in debug builds.
pub const TEST_APP_OPEN_UNIT_ID: &str = "ca-app-pub-3940256099942544/9257395921";

/// Google's public test publisher id used by the HTML fallback markup.
pub const TEST_AD_CLIENT: &str = "ca-pub-3940256099942544";

/// Host platform, used to pick the ad unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Platform of the running binary.  Anything that is not iOS is
    /// treated as Android.
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Self::Ios
        } else {
            Self::Android
        }
    }
}

/// Core ad configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdConfig {
    // --- Freshness / pacing ---
    /// Maximum age of a loaded-but-unshown ad (seconds)
    pub max_age_secs: u32,
    /// Minimum spacing between two display attempts (seconds)
    pub cooldown_secs: u32,
    /// Delay before the first-run foreground check (milliseconds)
    pub first_run_delay_ms: u32,

    // --- Ad units ---
    /// App Open unit for Android
    pub android_unit_id: String,
    /// App Open unit for iOS
    pub ios_unit_id: String,
    /// Publisher id for the HTML fallback markup
    pub ad_client: String,

    // --- Presentation ---
    /// Self-closing countdown of the fallback interstitial (seconds)
    pub presentation_timeout_secs: u8,
    /// A presentation with no close or error after this long is treated
    /// as failed (seconds).  Must exceed `presentation_timeout_secs`.
    pub presentation_watchdog_secs: u32,
}

impl Default for AdConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 4 * 60 * 60, // 4 h
            cooldown_secs: 5 * 60,     // 5 min
            first_run_delay_ms: 1000,  // let the first frame paint

            android_unit_id: TEST_APP_OPEN_UNIT_ID.to_string(),
            ios_unit_id: TEST_APP_OPEN_UNIT_ID.to_string(),
            ad_client: TEST_AD_CLIENT.to_string(),

            presentation_timeout_secs: 5,
            presentation_watchdog_secs: 60,
        }
    }
}

impl AdConfig {
    /// Parse and validate a JSON document.  Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would disable the pacing rules outright.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_age_secs == 0 {
            return Err(ConfigError::ValidationFailed("max_age_secs must be > 0"));
        }
        if self.presentation_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "presentation_timeout_secs must be > 0",
            ));
        }
        if self.presentation_watchdog_secs <= u32::from(self.presentation_timeout_secs) {
            return Err(ConfigError::ValidationFailed(
                "presentation_watchdog_secs must exceed presentation_timeout_secs",
            ));
        }
        if self.android_unit_id.is_empty() || self.ios_unit_id.is_empty() {
            return Err(ConfigError::ValidationFailed("ad unit ids must not be empty"));
        }
        Ok(())
    }

    /// Ad unit for the given platform.
    pub fn ad_unit_id(&self, platform: Platform) -> &str {
        match platform {
            Platform::Android => &self.android_unit_id,
            Platform::Ios => &self.ios_unit_id,
        }
    }

    pub fn max_age_ms(&self) -> u64 {
        u64::from(self.max_age_secs) * 1000
    }

    pub fn cooldown_ms(&self) -> u64 {
        u64::from(self.cooldown_secs) * 1000
    }

    pub fn presentation_watchdog_ms(&self) -> u64 {
        u64::from(self.presentation_watchdog_secs) * 1000
    }
}
