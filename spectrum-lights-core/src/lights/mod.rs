//! Turn band levels into something an LED can show.
//!
//! The real pin toggling happens on the host. Only the duty cycle is decided here.
mod pwm;

pub use pwm::{PwmBands, PwmMapper};
