//! Platform abstraction layer
//!
//! The simulation never reads the wall clock directly. Hosts pick a
//! [`Clock`]: the system monotonic clock for real play, or a manually
//! advanced clock for tests and headless runs.

pub mod time;

pub use time::{Clock, ManualClock, SystemClock};
