//! Personal details shared by staff and patients.

use cares_types::{DateOfBirth, PersonName, PhoneNumber, ValidationError};
use serde::{Deserialize, Serialize};

/// Name, date of birth and contact details of a person.
///
/// Every setter validates its input and leaves the current value untouched on
/// error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    first_name: PersonName,
    last_name: PersonName,
    dob: DateOfBirth,
    #[serde(default)]
    address: String,
    #[serde(default)]
    phone: Option<PhoneNumber>,
}

impl Person {
    pub fn new(
        last_name: PersonName,
        first_name: PersonName,
        dob: DateOfBirth,
        address: impl Into<String>,
        phone: Option<PhoneNumber>,
    ) -> Self {
        Self {
            first_name,
            last_name,
            dob,
            address: address.into(),
            phone,
        }
    }

    /// Builds a person from raw form input, validating every field.
    pub fn parse(
        last_name: &str,
        first_name: &str,
        dob: &str,
        address: &str,
        phone: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self::new(
            PersonName::new(last_name)?,
            PersonName::new(first_name)?,
            DateOfBirth::new(dob)?,
            address,
            PhoneNumber::parse_optional(phone)?,
        ))
    }

    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    pub fn set_first_name(&mut self, value: &str) -> Result<(), ValidationError> {
        self.first_name = PersonName::new(value)?;
        Ok(())
    }

    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    pub fn set_last_name(&mut self, value: &str) -> Result<(), ValidationError> {
        self.last_name = PersonName::new(value)?;
        Ok(())
    }

    pub fn dob(&self) -> &DateOfBirth {
        &self.dob
    }

    pub fn set_dob(&mut self, value: &str) -> Result<(), ValidationError> {
        self.dob = DateOfBirth::new(value)?;
        Ok(())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_address(&mut self, value: &str) {
        self.address = value.to_string();
    }

    /// The phone number, or `""` when none is on file.
    pub fn phone(&self) -> &str {
        self.phone.as_ref().map(PhoneNumber::as_str).unwrap_or("")
    }

    /// Sets the phone number; the empty string clears it.
    pub fn set_phone(&mut self, value: &str) -> Result<(), ValidationError> {
        self.phone = PhoneNumber::parse_optional(value)?;
        Ok(())
    }

    /// `Last, First` as shown on the desk and the bill.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// The patient table key for this identity: last name, first name and date
    /// of birth concatenated.
    pub fn record_key(&self) -> String {
        record_key(self.last_name(), self.first_name(), self.dob.as_str())
    }
}

/// Builds a patient table key from its three identity parts.
pub fn record_key(last_name: &str, first_name: &str, dob: &str) -> String {
    format!("{last_name}{first_name}{dob}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Person {
        Person::parse("Doe", "Jane", "01/01/1990", "1 Main St", "555-123-4567").unwrap()
    }

    #[test]
    fn record_key_concatenates_identity() {
        assert_eq!(jane().record_key(), "DoeJane01/01/1990");
        assert_eq!(jane().display_name(), "Doe, Jane");
    }

    #[test]
    fn valid_phone_numbers_are_echoed() {
        let mut person = jane();
        for phone in ["000-000-0000", "999-999-9999", "212-555-0199"] {
            person.set_phone(phone).unwrap();
            assert_eq!(person.phone(), phone);
        }
    }

    #[test]
    fn invalid_phone_keeps_previous_value() {
        let mut person = jane();
        for bad in ["5551234567", "555-123-45678", "phone", " 555-123-4567"] {
            assert_eq!(person.set_phone(bad), Err(ValidationError::InvalidPhone));
            assert_eq!(person.phone(), "555-123-4567");
        }

        person.set_phone("").unwrap();
        assert_eq!(person.phone(), "");
    }

    #[test]
    fn invalid_names_and_dates_keep_previous_values() {
        let mut person = jane();
        assert!(person.set_first_name("J4ne").is_err());
        assert!(person.set_last_name("").is_err());
        assert!(person.set_dob("1/1/1990").is_err());

        assert_eq!(person.first_name(), "Jane");
        assert_eq!(person.last_name(), "Doe");
        assert_eq!(person.dob().as_str(), "01/01/1990");

        person.set_last_name("O'Neil").unwrap();
        assert_eq!(person.record_key(), "O'NeilJane01/01/1990");
    }
}
