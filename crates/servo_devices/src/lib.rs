//!Hardware implementations of the `servo_core` controller traits.

pub mod devices;
pub mod error;
