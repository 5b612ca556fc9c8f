//! Telemetry groups: fixed subsets of readings published together

use crate::sensor::{Quantity, SensorSource};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown telemetry group: {0}")]
pub struct UnknownGroup(pub String);

/// One field of a telemetry message
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryField {
    /// Field name on the wire
    pub key: &'static str,
    pub quantity: Quantity,
    /// Multiplier applied to the raw reading (unit conversion)
    pub scale: f64,
}

impl TelemetryField {
    fn new(key: &'static str, quantity: Quantity, scale: f64) -> Self {
        Self { key, quantity, scale }
    }
}

/// A single scaled reading, ready for encoding
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub key: &'static str,
    pub value: f64,
}

/// The readings of one group taken in one act phase
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sample {
    pub readings: Vec<Reading>,
}

impl Sample {
    pub fn new(readings: impl IntoIterator<Item = (&'static str, f64)>) -> Self {
        Self {
            readings: readings
                .into_iter()
                .map(|(key, value)| Reading { key, value })
                .collect(),
        }
    }
}

/// A fixed set of fields sampled and published as one message
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryGroup {
    /// Position in the sampling rotation
    pub index: usize,
    pub name: &'static str,
    pub fields: Vec<TelemetryField>,
}

impl TelemetryGroup {
    /// Names of the built-in groups, in default sampling order
    pub const BUILTIN: [&'static str; 4] = ["environment", "magnetometer", "accelerometer", "gyroscope"];

    /// Look up a built-in group by name
    pub fn builtin(name: &str) -> Option<Self> {
        let (name, fields) = match name {
            "environment" => (
                "environment",
                vec![
                    TelemetryField::new("humidity", Quantity::Humidity, 1.0),
                    TelemetryField::new("temperature", Quantity::Temperature, 1.0),
                    // hPa -> kPa
                    TelemetryField::new("pressure", Quantity::Pressure, 0.1),
                ],
            ),
            "magnetometer" => (
                "magnetometer",
                vec![
                    TelemetryField::new("magnetometerX", Quantity::MagneticX, 1.0),
                    TelemetryField::new("magnetometerY", Quantity::MagneticY, 1.0),
                    TelemetryField::new("magnetometerZ", Quantity::MagneticZ, 1.0),
                ],
            ),
            "accelerometer" => (
                "accelerometer",
                vec![
                    TelemetryField::new("accelerometerX", Quantity::AccelerationX, 0.001),
                    TelemetryField::new("accelerometerY", Quantity::AccelerationY, 0.001),
                    TelemetryField::new("accelerometerZ", Quantity::AccelerationZ, 0.001),
                ],
            ),
            "gyroscope" => (
                "gyroscope",
                vec![
                    TelemetryField::new("gyroscopeX", Quantity::AngularRateX, 0.001),
                    TelemetryField::new("gyroscopeY", Quantity::AngularRateY, 0.001),
                    TelemetryField::new("gyroscopeZ", Quantity::AngularRateZ, 0.001),
                ],
            ),
            _ => return None,
        };

        Some(Self {
            index: 0,
            name,
            fields,
        })
    }

    /// Build the rotation from group names, assigning indices in order
    pub fn ordered(names: &[String]) -> Result<Vec<Self>, UnknownGroup> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let mut group = Self::builtin(name).ok_or_else(|| UnknownGroup(name.clone()))?;
                group.index = index;
                Ok(group)
            })
            .collect()
    }

    /// Read every field of this group from the source
    pub fn sample(&self, source: &dyn SensorSource) -> Sample {
        Sample::new(
            self.fields
                .iter()
                .map(|field| (field.key, source.read(field.quantity) * field.scale)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixedSensors;

    #[test]
    fn every_builtin_name_resolves() {
        for name in TelemetryGroup::BUILTIN {
            let group = TelemetryGroup::builtin(name).expect(name);
            assert_eq!(group.name, name);
            assert_eq!(group.fields.len(), 3);
        }
        assert!(TelemetryGroup::builtin("lidar").is_none());
    }

    #[test]
    fn ordered_assigns_indices() {
        let names = vec!["gyroscope".to_string(), "environment".to_string()];
        let groups = TelemetryGroup::ordered(&names).unwrap();
        assert_eq!(groups[0].name, "gyroscope");
        assert_eq!(groups[0].index, 0);
        assert_eq!(groups[1].name, "environment");
        assert_eq!(groups[1].index, 1);
    }

    #[test]
    fn ordered_rejects_unknown_names() {
        let names = vec!["environment".to_string(), "sonar".to_string()];
        assert_eq!(
            TelemetryGroup::ordered(&names),
            Err(UnknownGroup("sonar".into()))
        );
    }

    #[test]
    fn sample_applies_scale() {
        let sensors = FixedSensors::new(&[
            (Quantity::Humidity, 45.67),
            (Quantity::Temperature, 21.34),
            (Quantity::Pressure, 1013.0),
        ]);
        let group = TelemetryGroup::builtin("environment").unwrap();
        let sample = group.sample(&sensors);

        assert_eq!(sample.readings[0], Reading { key: "humidity", value: 45.67 });
        assert_eq!(sample.readings[1], Reading { key: "temperature", value: 21.34 });
        assert!((sample.readings[2].value - 101.3).abs() < 1e-9);
    }

    #[test]
    fn gyroscope_reads_each_axis() {
        let sensors = FixedSensors::new(&[
            (Quantity::AngularRateX, 1000.0),
            (Quantity::AngularRateY, 2000.0),
            (Quantity::AngularRateZ, 3000.0),
        ]);
        let sample = TelemetryGroup::builtin("gyroscope").unwrap().sample(&sensors);
        for (reading, expected) in sample.readings.iter().zip([1.0, 2.0, 3.0]) {
            assert!((reading.value - expected).abs() < 1e-9, "{:?}", reading);
        }
    }
}
