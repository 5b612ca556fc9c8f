//! Physical side effects driven by commands
//!
//! Register-level drivers live outside this crate; the node only needs an LED
//! it can switch and a line of text it can show.

use tracing::info;

/// Switchable LED
pub trait Actuator: Send + Sync {
    fn set_led(&self, on: bool);
}

/// Single-line text display
pub trait TextDisplay: Send + Sync {
    fn show(&self, text: &str);
}

/// LED that only logs its state changes
#[derive(Debug, Default)]
pub struct LogLed;

impl Actuator for LogLed {
    fn set_led(&self, on: bool) {
        info!("LED {}", if on { "on" } else { "off" });
    }
}

/// Display that writes its text to the log
#[derive(Debug, Default)]
pub struct LogDisplay;

impl TextDisplay for LogDisplay {
    fn show(&self, text: &str) {
        info!("Display: {}", text);
    }
}
