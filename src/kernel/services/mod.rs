//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used across the crate.
//! - `adapters`: runtime specific implementations (threads, timers, temp files).

pub mod adapters;
pub mod bus;
pub mod ports;

pub use bus::{sc_event_bus, ScEventReceiver, ScEventSender};
