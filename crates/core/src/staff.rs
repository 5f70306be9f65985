//! Staff accounts and roles.

use crate::capability::{self, Capability};
use crate::person::Person;
use cares_types::{NonEmptyText, ValidationError};
use serde::{Deserialize, Serialize};

/// The job a staff account is registered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffRole {
    Doctor,
    Nurse,
    EmergencyRoomStaff,
    BillingStaff,
}

impl StaffRole {
    pub const ALL: [StaffRole; 4] = [
        StaffRole::Doctor,
        StaffRole::Nurse,
        StaffRole::EmergencyRoomStaff,
        StaffRole::BillingStaff,
    ];

    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            StaffRole::Doctor => capability::DOCTOR,
            StaffRole::Nurse => capability::NURSE,
            StaffRole::EmergencyRoomStaff => capability::EMERGENCY_ROOM_STAFF,
            StaffRole::BillingStaff => capability::BILLING_STAFF,
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StaffRole::Doctor => "Doctor",
            StaffRole::Nurse => "Nurse",
            StaffRole::EmergencyRoomStaff => "Front Desk",
            StaffRole::BillingStaff => "Billing",
        }
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A staff member with login credentials.
///
/// Credentials are plaintext and looked up by [`Staff::login_key`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    person: Person,
    role: StaffRole,
    username: NonEmptyText,
    password: NonEmptyText,
}

impl Staff {
    pub fn new(
        person: Person,
        role: StaffRole,
        username: &str,
        password: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            person,
            role,
            username: NonEmptyText::new(username)?,
            password: NonEmptyText::new(password)?,
        })
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub fn role(&self) -> StaffRole {
        self.role
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }

    pub fn login_key(&self) -> String {
        login_key(self.username(), self.password())
    }
}

/// Builds a login table key: username and password concatenated.
pub fn login_key(username: &str, password: &str) -> String {
    format!("{username}{password}")
}

/// The accounts a fresh installation starts with, one per role.
pub fn seed_accounts() -> Result<Vec<Staff>, ValidationError> {
    let person = Person::parse(
        "Doe",
        "John",
        "01/14/2000",
        "Somewhere Drive",
        "890-874-2222",
    )?;

    [
        (StaffRole::BillingStaff, "Billing"),
        (StaffRole::EmergencyRoomStaff, "Staff"),
        (StaffRole::Nurse, "Nurse"),
        (StaffRole::Doctor, "Doctor"),
    ]
    .into_iter()
    .map(|(role, username)| Staff::new(person.clone(), role, username, "123"))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_desk_checks_in_but_cannot_search() {
        let role = StaffRole::EmergencyRoomStaff;
        assert!(role.can(Capability::CheckInPatient));
        assert!(role.can(Capability::EditBasicInfo));
        assert!(!role.can(Capability::SearchPatients));
        assert!(!role.can(Capability::RunLabs));
    }

    #[test]
    fn nurses_admit_and_start_discharge_but_do_not_diagnose() {
        let role = StaffRole::Nurse;
        assert!(role.can(Capability::AdmitPatient));
        assert!(role.can(Capability::StartDischarge));
        assert!(role.can(Capability::RunLabs));
        assert!(!role.can(Capability::CheckInPatient));
        assert!(!role.can(Capability::Diagnose));
        assert!(!role.can(Capability::CompleteDischarge));
    }

    #[test]
    fn doctors_hold_every_nurse_capability() {
        for capability in StaffRole::Nurse.capabilities() {
            assert!(StaffRole::Doctor.can(*capability), "{capability}");
        }
        assert!(StaffRole::Doctor.can(Capability::Diagnose));
        assert!(StaffRole::Doctor.can(Capability::CompleteDischarge));
        assert!(!StaffRole::Doctor.can(Capability::ViewDischarged));
    }

    #[test]
    fn billing_sees_discharged_patients_and_bills_only() {
        let role = StaffRole::BillingStaff;
        assert!(role.can(Capability::ViewDischarged));
        assert!(role.can(Capability::ViewBill));
        assert!(!role.can(Capability::EditBasicInfo));
        assert!(!role.can(Capability::EditMedicalInfo));
    }

    #[test]
    fn seed_accounts_cover_every_role() {
        let accounts = seed_accounts().unwrap();
        let keys: Vec<String> = accounts.iter().map(Staff::login_key).collect();
        assert_eq!(keys, ["Billing123", "Staff123", "Nurse123", "Doctor123"]);

        for role in StaffRole::ALL {
            assert!(accounts.iter().any(|s| s.role() == role));
        }
    }

    #[test]
    fn credentials_must_not_be_blank() {
        let person = seed_accounts().unwrap()[0].person().clone();
        assert!(Staff::new(person, StaffRole::Nurse, "", "pw").is_err());
    }
}
