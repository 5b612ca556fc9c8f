//! Sensor source boundary.
//!
//! The scheduler only ever asks for "the current reading of quantity X";
//! register-level drivers live behind [`SensorSource`].

use std::sync::atomic::{AtomicU64, Ordering};

/// A physical quantity the board can measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Relative humidity (%)
    Humidity,
    /// Temperature (°C)
    Temperature,
    /// Barometric pressure (hPa)
    Pressure,
    /// Magnetic field (mG)
    MagneticX,
    MagneticY,
    MagneticZ,
    /// Linear acceleration (mg)
    AccelerationX,
    AccelerationY,
    AccelerationZ,
    /// Angular rate (mdps)
    AngularRateX,
    AngularRateY,
    AngularRateZ,
}

/// Pull-based access to the board's sensors.
///
/// Reads always succeed with a best-effort value.
pub trait SensorSource: Send + Sync {
    fn read(&self, quantity: Quantity) -> f64;
}

/// Slowly drifting readings around plausible bench values
#[derive(Debug, Default)]
pub struct SimulatedSensors {
    reads: AtomicU64,
}

impl SimulatedSensors {
    pub fn new() -> Self {
        Self::default()
    }

    fn baseline(quantity: Quantity) -> (f64, f64) {
        // (centre, swing)
        match quantity {
            Quantity::Humidity => (45.0, 5.0),
            Quantity::Temperature => (22.0, 1.5),
            Quantity::Pressure => (1013.0, 4.0),
            Quantity::MagneticX => (-120.0, 15.0),
            Quantity::MagneticY => (340.0, 15.0),
            Quantity::MagneticZ => (-560.0, 15.0),
            Quantity::AccelerationX => (12.0, 6.0),
            Quantity::AccelerationY => (-8.0, 6.0),
            Quantity::AccelerationZ => (1000.0, 6.0),
            Quantity::AngularRateX => (350.0, 120.0),
            Quantity::AngularRateY => (-700.0, 120.0),
            Quantity::AngularRateZ => (140.0, 120.0),
        }
    }
}

impl SensorSource for SimulatedSensors {
    fn read(&self, quantity: Quantity) -> f64 {
        let n = self.reads.fetch_add(1, Ordering::Relaxed) as f64;
        let (centre, swing) = Self::baseline(quantity);
        centre + swing * (n * 0.07).sin()
    }
}
