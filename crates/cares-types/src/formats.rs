//! Field formats accepted at the desk.

use crate::{validated_text, ValidationError};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z'-]+$").expect("name pattern compiles"))
}

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").expect("date pattern compiles"))
}

fn phone_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]{3}-[0-9]{3}-[0-9]{4}$").expect("phone pattern compiles")
    })
}

fn blood_pressure_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]{1,3})/([0-9]{1,3})$").expect("blood pressure pattern compiles")
    })
}

/// A first or last name: letters, apostrophes and hyphens only.
///
/// Unlike [`NonEmptyText`](crate::NonEmptyText) the input is not trimmed; a
/// name with surrounding whitespace is rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, ValidationError> {
        let input = input.as_ref();
        if !name_pattern().is_match(input) {
            return Err(ValidationError::InvalidName);
        }
        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

validated_text!(PersonName);

/// A date of birth written `MM/DD/YYYY`.
///
/// The text form is kept verbatim because it is part of the patient lookup
/// key; the parsed calendar date is available through [`DateOfBirth::date`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateOfBirth {
    text: String,
    date: NaiveDate,
}

impl DateOfBirth {
    pub fn new(input: impl AsRef<str>) -> Result<Self, ValidationError> {
        let input = input.as_ref();
        if !date_pattern().is_match(input) {
            return Err(ValidationError::InvalidDate);
        }
        let date = NaiveDate::parse_from_str(input, "%m/%d/%Y")
            .map_err(|_| ValidationError::InvalidDate)?;
        Ok(Self {
            text: input.to_owned(),
            date,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

validated_text!(DateOfBirth);

/// A North American phone number written `NNN-NNN-NNNN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(input: impl AsRef<str>) -> Result<Self, ValidationError> {
        let input = input.as_ref();
        if !phone_pattern().is_match(input) {
            return Err(ValidationError::InvalidPhone);
        }
        Ok(Self(input.to_owned()))
    }

    /// Parses optional form input: the empty string clears the number.
    pub fn parse_optional(input: &str) -> Result<Option<Self>, ValidationError> {
        if input.is_empty() {
            return Ok(None);
        }
        Self::new(input).map(Some)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

validated_text!(PhoneNumber);

/// A blood pressure reading.
///
/// The reading keeps the text it was entered as, so `080/060` is shown back
/// as `080/060`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BloodPressure {
    text: String,
    systolic: u16,
    diastolic: u16,
}

impl BloodPressure {
    pub const MAX_SYSTOLIC: u16 = 200;
    pub const MAX_DIASTOLIC: u16 = 150;

    /// Parses `systolic/diastolic`, each one to three digits. Surrounding
    /// whitespace is ignored.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        let caps = blood_pressure_pattern()
            .captures(input)
            .ok_or(ValidationError::InvalidBloodPressureFormat)?;

        // The pattern bounds both parts to three digits, so they fit in u16.
        let systolic: u16 = caps[1]
            .parse()
            .map_err(|_| ValidationError::InvalidBloodPressureFormat)?;
        let diastolic: u16 = caps[2]
            .parse()
            .map_err(|_| ValidationError::InvalidBloodPressureFormat)?;

        if systolic > Self::MAX_SYSTOLIC || diastolic > Self::MAX_DIASTOLIC {
            return Err(ValidationError::BloodPressureOutOfRange);
        }
        Ok(Self {
            text: input.to_owned(),
            systolic,
            diastolic,
        })
    }

    pub fn systolic(&self) -> u16 {
        self.systolic
    }

    pub fn diastolic(&self) -> u16 {
        self.diastolic
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for BloodPressure {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for BloodPressure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for BloodPressure {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        BloodPressure::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_accept_letters_apostrophes_and_hyphens() {
        for ok in ["Doe", "O'Brien", "Smith-Jones", "x"] {
            assert!(PersonName::new(ok).is_ok(), "{ok} should be accepted");
        }
        for bad in ["", "Doe2", "Jane Doe", " Doe", "Zoë"] {
            assert_eq!(
                PersonName::new(bad),
                Err(ValidationError::InvalidName),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn date_of_birth_requires_format_and_real_date() {
        let dob = DateOfBirth::new("01/01/1990").unwrap();
        assert_eq!(dob.as_str(), "01/01/1990");
        assert_eq!(dob.date(), NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());

        assert_eq!(
            DateOfBirth::new("1/14/2000"),
            Err(ValidationError::InvalidDate)
        );
        assert_eq!(
            DateOfBirth::new("13/01/1990"),
            Err(ValidationError::InvalidDate)
        );
        assert_eq!(
            DateOfBirth::new("02/30/1990"),
            Err(ValidationError::InvalidDate)
        );
        assert_eq!(
            DateOfBirth::new("1990-01-01"),
            Err(ValidationError::InvalidDate)
        );
    }

    #[test]
    fn phone_numbers_must_be_dash_separated_digits() {
        assert_eq!(
            PhoneNumber::new("555-123-4567").unwrap().as_str(),
            "555-123-4567"
        );
        for bad in ["5551234567", "555-1234-567", "555-123-456a", "(555) 123-4567"] {
            assert_eq!(PhoneNumber::new(bad), Err(ValidationError::InvalidPhone));
        }
        assert_eq!(PhoneNumber::parse_optional("").unwrap(), None);
        assert!(PhoneNumber::parse_optional("555").is_err());
    }

    #[test]
    fn blood_pressure_checks_format_then_range() {
        let bp = BloodPressure::parse("120/80").unwrap();
        assert_eq!((bp.systolic(), bp.diastolic()), (120, 80));
        assert_eq!(bp.to_string(), "120/80");

        let padded = BloodPressure::parse("080/060").unwrap();
        assert_eq!((padded.systolic(), padded.diastolic()), (80, 60));
        assert_eq!(padded.to_string(), "080/060");
        assert_eq!(BloodPressure::parse(" 120/80 ").unwrap().as_str(), "120/80");

        assert!(BloodPressure::parse("200/150").is_ok());
        assert!(BloodPressure::parse("0/0").is_ok());
        assert_eq!(
            BloodPressure::parse("201/80"),
            Err(ValidationError::BloodPressureOutOfRange)
        );
        assert_eq!(
            BloodPressure::parse("120/151"),
            Err(ValidationError::BloodPressureOutOfRange)
        );
        for bad in ["120-80", "1200/80", "120/", "abc", "", "   "] {
            assert_eq!(
                BloodPressure::parse(bad),
                Err(ValidationError::InvalidBloodPressureFormat)
            );
        }
    }

    #[test]
    fn validated_types_reject_bad_input_on_deserialize() {
        assert!(serde_json::from_str::<PhoneNumber>("\"555-123-4567\"").is_ok());
        assert!(serde_json::from_str::<PhoneNumber>("\"nope\"").is_err());
        assert!(serde_json::from_str::<BloodPressure>("\"300/80\"").is_err());
        let bp: BloodPressure = serde_json::from_str("\"118/76\"").unwrap();
        assert_eq!(serde_json::to_string(&bp).unwrap(), "\"118/76\"");
        let bp: BloodPressure = serde_json::from_str("\"090/070\"").unwrap();
        assert_eq!(serde_json::to_string(&bp).unwrap(), "\"090/070\"");
    }
}
