//! Ad inventory: the single ad slot.
//!
//! There is exactly one App Open ad unit, so there is exactly one slot.
//! The slot's contents are an enum with data, which makes the two data
//! invariants structural rather than checked:
//!
//! - a handle exists iff the slot is `Loaded` or `Showing`
//! - a load timestamp exists iff a handle exists
//!
//! Each load request bumps a [`Generation`].  Completions carry the
//! generation they answer, so a late LOADED/ERROR from a superseded
//! request can be recognised and dropped.

use core::fmt;

/// Opaque reference to a loaded ad instance, minted by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdHandle(pub u64);

impl fmt::Display for AdHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ad#{}", self.0)
    }
}

/// Identity of one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u32);

impl Generation {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A successfully loaded ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedAd {
    pub handle: AdHandle,
    /// Clock reading (ms) at which the load completed.
    pub loaded_at: u64,
}

/// Observable slot state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotState {
    Empty,
    Loading,
    Loaded,
    Showing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contents {
    Empty,
    Loading,
    Loaded(LoadedAd),
    Showing(LoadedAd),
}

/// The single outstanding ad request / handle.
#[derive(Debug, Clone)]
pub struct AdSlot {
    contents: Contents,
    generation: Generation,
}

impl Default for AdSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl AdSlot {
    pub fn new() -> Self {
        Self {
            contents: Contents::Empty,
            generation: Generation::default(),
        }
    }

    pub fn state(&self) -> SlotState {
        match self.contents {
            Contents::Empty => SlotState::Empty,
            Contents::Loading => SlotState::Loading,
            Contents::Loaded(_) => SlotState::Loaded,
            Contents::Showing(_) => SlotState::Showing,
        }
    }

    /// Generation of the most recent load request.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn handle(&self) -> Option<AdHandle> {
        self.ad().map(|ad| ad.handle)
    }

    pub fn loaded_at(&self) -> Option<u64> {
        self.ad().map(|ad| ad.loaded_at)
    }

    /// The cached ad, whether waiting or on screen.
    pub fn ad(&self) -> Option<LoadedAd> {
        match self.contents {
            Contents::Loaded(ad) | Contents::Showing(ad) => Some(ad),
            Contents::Empty | Contents::Loading => None,
        }
    }

    /// Start a new load.  Whatever the slot held is dropped.
    pub fn begin_loading(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.contents = Contents::Loading;
        self.generation
    }

    /// Store the result of the current load.
    ///
    /// Returns `false` (and changes nothing) unless the slot is `Loading`
    /// and `generation` is the one that was last issued.
    pub fn fill(&mut self, generation: Generation, handle: AdHandle, now_ms: u64) -> bool {
        if self.contents != Contents::Loading || generation != self.generation {
            return false;
        }
        self.contents = Contents::Loaded(LoadedAd {
            handle,
            loaded_at: now_ms,
        });
        true
    }

    /// Move the cached ad on screen.  `None` if nothing is loaded.
    pub fn begin_showing(&mut self) -> Option<AdHandle> {
        match self.contents {
            Contents::Loaded(ad) => {
                self.contents = Contents::Showing(ad);
                Some(ad.handle)
            }
            _ => None,
        }
    }

    /// Whether `handle` is the ad currently on screen.
    pub fn is_showing(&self, handle: AdHandle) -> bool {
        matches!(self.contents, Contents::Showing(ad) if ad.handle == handle)
    }

    /// Empty the slot, returning the ad it held (if any).
    pub fn clear(&mut self) -> Option<LoadedAd> {
        let ad = self.ad();
        self.contents = Contents::Empty;
        ad
    }
}
