//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements          | Connects to                    |
//! |--------------|---------------------|--------------------------------|
//! | `foreground` | ForegroundSource    | Host app-state notifications   |
//! | `html`       | AdProvider          | PresentationSurface (web view) |
//! | `log_sink`   | EventSink           | `log` facade                   |
//! | `simulated`  | AdProvider          | In-process fake ad network     |
//! | `time`       | Clock               | `Instant` / manual test clock  |

pub mod foreground;
pub mod html;
pub mod log_sink;
pub mod simulated;
pub mod time;
