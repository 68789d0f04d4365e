//! Platform drivers: worker thread spawning and blocking delays.

pub mod delay;
pub mod task_pin;
