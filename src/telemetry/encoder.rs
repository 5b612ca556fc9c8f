//! Fixed-precision telemetry encoding
//!
//! A message is a flat JSON object, fields in group order:
//! ```text
//! {"humidity":45.6,"temperature":21.3,"pressure":101.3}
//! ```
//!
//! Numbers carry exactly one fractional digit. That digit is the tens digit of
//! the rounded hundredths, so the second decimal is dropped rather than rounded
//! into the first (45.67 encodes as 45.6). Consumers of the wire format depend
//! on this; keep it.

use super::groups::Sample;
use bytes::Bytes;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("Telemetry message is {size} bytes, budget is {max}")]
    TooLarge { size: usize, max: usize },

    #[error("Reading {0} is not finite or is outside the integer range")]
    Unrepresentable(&'static str),
}

/// Serializes samples into size-bounded telemetry messages
#[derive(Debug, Clone)]
pub struct TelemetryEncoder {
    max_message_size: usize,
}

impl TelemetryEncoder {
    pub fn new(max_message_size: usize) -> Self {
        Self { max_message_size }
    }

    /// Encode one sample; fails instead of truncating when over budget
    pub fn encode(&self, sample: &Sample) -> Result<Bytes, EncodeError> {
        let mut message = String::with_capacity(self.max_message_size);
        message.push('{');
        for (i, reading) in sample.readings.iter().enumerate() {
            if i > 0 {
                message.push(',');
            }
            let number = format_reading(reading.value)
                .ok_or(EncodeError::Unrepresentable(reading.key))?;
            message.push('"');
            message.push_str(reading.key);
            message.push_str("\":");
            message.push_str(&number);
        }
        message.push('}');

        if message.len() > self.max_message_size {
            return Err(EncodeError::TooLarge {
                size: message.len(),
                max: self.max_message_size,
            });
        }

        Ok(Bytes::from(message))
    }
}

/// Render `value` as `<integer part>.<one digit>`.
///
/// `None` for NaN, infinity, or an integer part that does not fit an `i64`.
/// The integer part truncates toward zero. Values in (-1, 0) keep their minus
/// sign, which the integer part alone would lose.
pub fn format_reading(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    let integer_part = value.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if integer_part < i64::MIN as f64 || integer_part >= i64::MAX as f64 {
        return None;
    }
    let hundredths = ((value - integer_part) * 100.0).round().abs() as u32;
    // 99.5 and up rounds to 100; the digit still may not carry
    let digit = (hundredths / 10).min(9);

    let sign = if value < 0.0 && integer_part == 0.0 && digit > 0 {
        "-"
    } else {
        ""
    };
    Some(format!("{}{}.{}", sign, integer_part as i64, digit))
}
