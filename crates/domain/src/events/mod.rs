//! Domain events
//!
//! [`TriggerEvent`] comes in from the outside world; [`UnlockEvent`] goes out
//! when a badge is earned.

mod trigger;
mod unlock;

pub use trigger::{TriggerEvent, TriggerKind};
pub use unlock::UnlockEvent;
