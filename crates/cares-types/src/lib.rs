//! Validated value types shared by the C.A.R.E.S. crates.
//!
//! Every form field the front desk accepts has a fixed format. Each format is
//! expressed as a newtype whose constructor is the only way in, so a value of
//! the type is always valid once it exists:
//!
//! - [`NonEmptyText`]: trimmed text with at least one non-whitespace character
//! - [`PersonName`]: `[A-Za-z'-]+`
//! - [`DateOfBirth`]: `MM/DD/YYYY`, and a real calendar date
//! - [`PhoneNumber`]: `NNN-NNN-NNNN`
//! - [`BloodPressure`]: `systolic/diastolic`, systolic 0-200, diastolic 0-150
//!
//! The error messages are the ones shown to staff at the desk.

mod formats;

pub use formats::{BloodPressure, DateOfBirth, PersonName, PhoneNumber};

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    #[error("Invalid Input, names may only contain letters, apostrophes and hyphens")]
    InvalidName,

    #[error("Invalid Input, format should be MM/DD/YYYY")]
    InvalidDate,

    #[error("Invalid Input, format should be 000-000-0000")]
    InvalidPhone,

    #[error("Invalid blood pressure format. Correct format: 'systolic/diastolic'.")]
    InvalidBloodPressureFormat,

    #[error(
        "Blood pressure values out of range. Systolic should be 0-200 and diastolic should be 0-150."
    )]
    BloodPressureOutOfRange,

    /// A numeric measurement fell outside its accepted range.
    #[error("Invalid Input, Range of {range}")]
    OutOfRange { range: &'static str },

    /// A numeric measurement could not be parsed at all.
    #[error("Invalid Input, expected a number in the range {range}")]
    NotANumber { range: &'static str },
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, `ValidationError::Empty` is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Implements `Display`, `AsRef<str>` and validating serde for a text newtype
/// exposing `new(&str) -> Result<Self, ValidationError>` and `as_str()`.
macro_rules! validated_text {
    ($ty:ty) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                <$ty>::new(&s).map_err(serde::de::Error::custom)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::new(s)
            }
        }
    };
}

pub(crate) use validated_text;

validated_text!(NonEmptyText);
