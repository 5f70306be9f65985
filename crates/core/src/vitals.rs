//! Vital signs recorded by nursing staff.
//!
//! Every measurement is optional: `None` means it has not been taken yet.
//! Form input is parsed with the same rule for all numeric signs: the empty
//! string clears the value, anything else must be a number inside the sign's
//! accepted range.

use cares_types::{BloodPressure, ValidationError};
use serde::{Deserialize, Serialize};

/// Accepted range of a numeric vital sign.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasurementRange {
    pub min: f64,
    pub max: f64,
    /// Shown in warnings, e.g. `0-96 inches`.
    pub label: &'static str,
}

impl MeasurementRange {
    /// Parses optional form input against this range.
    pub fn parse(&self, input: &str) -> Result<Option<f64>, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let value: f64 = input
            .parse()
            .map_err(|_| ValidationError::NotANumber { range: self.label })?;

        if !(self.min..=self.max).contains(&value) {
            return Err(ValidationError::OutOfRange { range: self.label });
        }
        Ok(Some(value))
    }
}

pub const HEIGHT_RANGE: MeasurementRange = MeasurementRange {
    min: 0.0,
    max: 96.0,
    label: "0-96 inches",
};

pub const WEIGHT_RANGE: MeasurementRange = MeasurementRange {
    min: 0.0,
    max: 1000.0,
    label: "0-1000 pounds",
};

pub const HEART_RATE_RANGE: MeasurementRange = MeasurementRange {
    min: 0.0,
    max: 200.0,
    label: "0-200 BPM",
};

pub const OXYGEN_LEVEL_RANGE: MeasurementRange = MeasurementRange {
    min: 0.0,
    max: 100.0,
    label: "0-100%",
};

pub const BODY_TEMP_RANGE: MeasurementRange = MeasurementRange {
    min: 0.0,
    max: 150.0,
    label: "0-150 F",
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vitals {
    /// Inches.
    height: Option<f64>,
    /// Pounds.
    weight: Option<f64>,
    blood_pressure: Option<BloodPressure>,
    /// Beats per minute.
    heart_rate: Option<f64>,
    /// Oxygen saturation, percent.
    oxygen_level: Option<f64>,
    /// Degrees Fahrenheit.
    body_temp: Option<f64>,
}

impl Vitals {
    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn set_height(&mut self, input: &str) -> Result<(), ValidationError> {
        self.height = HEIGHT_RANGE.parse(input)?;
        Ok(())
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn set_weight(&mut self, input: &str) -> Result<(), ValidationError> {
        self.weight = WEIGHT_RANGE.parse(input)?;
        Ok(())
    }

    pub fn blood_pressure(&self) -> Option<&BloodPressure> {
        self.blood_pressure.as_ref()
    }

    pub fn set_blood_pressure(&mut self, input: &str) -> Result<(), ValidationError> {
        self.blood_pressure = if input.trim().is_empty() {
            None
        } else {
            Some(BloodPressure::parse(input)?)
        };
        Ok(())
    }

    pub fn heart_rate(&self) -> Option<f64> {
        self.heart_rate
    }

    pub fn set_heart_rate(&mut self, input: &str) -> Result<(), ValidationError> {
        self.heart_rate = HEART_RATE_RANGE.parse(input)?;
        Ok(())
    }

    pub fn oxygen_level(&self) -> Option<f64> {
        self.oxygen_level
    }

    pub fn set_oxygen_level(&mut self, input: &str) -> Result<(), ValidationError> {
        self.oxygen_level = OXYGEN_LEVEL_RANGE.parse(input)?;
        Ok(())
    }

    pub fn body_temp(&self) -> Option<f64> {
        self.body_temp
    }

    pub fn set_body_temp(&mut self, input: &str) -> Result<(), ValidationError> {
        self.body_temp = BODY_TEMP_RANGE.parse(input)?;
        Ok(())
    }

    /// Body mass index from height in inches and weight in pounds, rounded to
    /// two decimals. `None` unless both are recorded and positive.
    pub fn body_mass_index(&self) -> Option<f64> {
        match (self.height, self.weight) {
            (Some(height), Some(weight)) if height > 0.0 && weight > 0.0 => {
                let bmi = 703.0 * weight / (height * height);
                Some((bmi * 100.0).round() / 100.0)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurements_accept_range_bounds_and_clear_on_empty() {
        let mut vitals = Vitals::default();
        vitals.set_height("96").unwrap();
        vitals.set_weight("0").unwrap();
        assert_eq!(vitals.height(), Some(96.0));
        assert_eq!(vitals.weight(), Some(0.0));

        vitals.set_height("").unwrap();
        assert_eq!(vitals.height(), None);
    }

    #[test]
    fn out_of_range_or_garbage_keeps_previous_value() {
        let mut vitals = Vitals::default();
        vitals.set_heart_rate("72").unwrap();

        assert_eq!(
            vitals.set_heart_rate("201"),
            Err(ValidationError::OutOfRange { range: "0-200 BPM" })
        );
        assert_eq!(
            vitals.set_heart_rate("-1"),
            Err(ValidationError::OutOfRange { range: "0-200 BPM" })
        );
        assert_eq!(
            vitals.set_heart_rate("fast"),
            Err(ValidationError::NotANumber { range: "0-200 BPM" })
        );
        assert!(vitals.set_heart_rate("NaN").is_err());
        assert_eq!(vitals.heart_rate(), Some(72.0));
    }

    #[test]
    fn every_sign_uses_its_own_range() {
        let mut vitals = Vitals::default();
        assert!(vitals.set_oxygen_level("100.5").is_err());
        assert!(vitals.set_body_temp("150.1").is_err());
        assert!(vitals.set_weight("1000.01").is_err());
        vitals.set_oxygen_level("98.5").unwrap();
        vitals.set_body_temp("98.6").unwrap();
        assert_eq!(vitals.oxygen_level(), Some(98.5));
        assert_eq!(vitals.body_temp(), Some(98.6));
    }

    #[test]
    fn blood_pressure_keeps_previous_on_error() {
        let mut vitals = Vitals::default();
        vitals.set_blood_pressure("120/80").unwrap();
        assert!(vitals.set_blood_pressure("120-80").is_err());
        assert!(vitals.set_blood_pressure("250/80").is_err());
        assert_eq!(vitals.blood_pressure().unwrap().to_string(), "120/80");

        vitals.set_blood_pressure("").unwrap();
        assert_eq!(vitals.blood_pressure(), None);
    }

    #[test]
    fn blood_pressure_input_is_trimmed_like_other_vitals() {
        let mut vitals = Vitals::default();
        vitals.set_height(" 70").unwrap();
        vitals.set_blood_pressure(" 080/060 ").unwrap();
        assert_eq!(vitals.height(), Some(70.0));
        assert_eq!(vitals.blood_pressure().unwrap().to_string(), "080/060");

        vitals.set_blood_pressure("  ").unwrap();
        assert_eq!(vitals.blood_pressure(), None);
    }

    #[test]
    fn bmi_needs_positive_height_and_weight() {
        let mut vitals = Vitals::default();
        assert_eq!(vitals.body_mass_index(), None);

        vitals.set_height("70").unwrap();
        assert_eq!(vitals.body_mass_index(), None);

        vitals.set_weight("150").unwrap();
        // 703 * 150 / 4900 = 21.5204...
        assert_eq!(vitals.body_mass_index(), Some(21.52));

        vitals.set_height("0").unwrap();
        assert_eq!(vitals.body_mass_index(), None);
    }
}
