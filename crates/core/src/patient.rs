//! Patient records.
//!
//! A [`Patient`] is a [`Person`] plus everything the hospital tracks about one
//! visit: insurance, emergency contact, care status, dates, vitals, diagnosis
//! and the lab panel.
//!
//! Edits coming from forms go through [`PatientField`], which maps a field name
//! to its validated setter and to the capability needed to change it.

use crate::capability::Capability;
use crate::diagnosis::Diagnosis;
use crate::labs::LabPanel;
use crate::person::Person;
use crate::vitals::Vitals;
use crate::{CaresError, CaresResult};
use cares_types::{PhoneNumber, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a patient is in their stay.
///
/// ```text
/// CheckedIn ──admit──▶ Admitted
///     │                   │
///     └──start_discharge──┴──▶ DischargeStarted ──complete──▶ Discharged
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CareStatus {
    #[default]
    CheckedIn,
    Admitted,
    DischargeStarted,
    Discharged,
}

impl CareStatus {
    pub fn name(self) -> &'static str {
        match self {
            CareStatus::CheckedIn => "checked in",
            CareStatus::Admitted => "admitted",
            CareStatus::DischargeStarted => "discharge started",
            CareStatus::Discharged => "discharged",
        }
    }
}

impl std::fmt::Display for CareStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    person: Person,
    patient_id: String,
    #[serde(default)]
    insurance_plan: String,
    #[serde(default)]
    emergency_contact: Option<PhoneNumber>,
    #[serde(default)]
    status: CareStatus,
    admitted_date: NaiveDate,
    #[serde(default)]
    discharge_date: Option<NaiveDate>,
    #[serde(default)]
    discharge_instruction: String,
    #[serde(default)]
    vitals: Vitals,
    #[serde(default)]
    diagnosis: Diagnosis,
    #[serde(default)]
    lab_panel: LabPanel,
}

impl Patient {
    /// Checks in a new patient on `today`. The patient id is derived from the
    /// person's identity.
    pub fn new(
        person: Person,
        insurance_plan: impl Into<String>,
        emergency_contact: Option<PhoneNumber>,
        today: NaiveDate,
    ) -> Self {
        Self {
            patient_id: person.record_key(),
            person,
            insurance_plan: insurance_plan.into(),
            emergency_contact,
            status: CareStatus::CheckedIn,
            admitted_date: today,
            discharge_date: None,
            discharge_instruction: String::new(),
            vitals: Vitals::default(),
            diagnosis: Diagnosis::default(),
            lab_panel: LabPanel::default(),
        }
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub fn person_mut(&mut self) -> &mut Person {
        &mut self.person
    }

    /// The key this record was last stored under.
    ///
    /// It only changes when the store rekeys the record, so after an identity
    /// edit it can differ from [`Person::record_key`] until then.
    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub(crate) fn set_patient_id(&mut self, patient_id: String) {
        self.patient_id = patient_id;
    }

    pub fn insurance_plan(&self) -> &str {
        &self.insurance_plan
    }

    pub fn set_insurance_plan(&mut self, value: &str) {
        self.insurance_plan = value.to_string();
    }

    pub fn emergency_contact(&self) -> &str {
        self.emergency_contact
            .as_ref()
            .map(PhoneNumber::as_str)
            .unwrap_or("")
    }

    pub fn set_emergency_contact(&mut self, value: &str) -> Result<(), ValidationError> {
        self.emergency_contact = PhoneNumber::parse_optional(value)?;
        Ok(())
    }

    pub fn status(&self) -> CareStatus {
        self.status
    }

    pub fn is_discharged(&self) -> bool {
        self.status == CareStatus::Discharged
    }

    pub fn admitted_date(&self) -> NaiveDate {
        self.admitted_date
    }

    pub fn discharge_date(&self) -> Option<NaiveDate> {
        self.discharge_date
    }

    pub fn discharge_instruction(&self) -> &str {
        &self.discharge_instruction
    }

    pub fn set_discharge_instruction(&mut self, value: &str) {
        self.discharge_instruction = value.to_string();
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    pub fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    pub fn diagnosis(&self) -> &Diagnosis {
        &self.diagnosis
    }

    pub fn diagnosis_mut(&mut self) -> &mut Diagnosis {
        &mut self.diagnosis
    }

    pub fn lab_panel(&self) -> &LabPanel {
        &self.lab_panel
    }

    pub fn lab_panel_mut(&mut self) -> &mut LabPanel {
        &mut self.lab_panel
    }

    /// Whole days between admission and discharge, or `today` while the
    /// patient is still in. Never negative.
    pub fn stay_days(&self, today: NaiveDate) -> i64 {
        let end = self.discharge_date.unwrap_or(today);
        (end - self.admitted_date).num_days().max(0)
    }

    /// Admits a checked-in patient. The stay is counted from `today`.
    pub fn admit(&mut self, today: NaiveDate) -> CaresResult<()> {
        self.transition("admit", &[CareStatus::CheckedIn], CareStatus::Admitted)?;
        self.admitted_date = today;
        Ok(())
    }

    pub fn start_discharge(&mut self) -> CaresResult<()> {
        self.transition(
            "start discharge for",
            &[CareStatus::CheckedIn, CareStatus::Admitted],
            CareStatus::DischargeStarted,
        )
    }

    pub fn complete_discharge(&mut self, today: NaiveDate) -> CaresResult<()> {
        self.transition(
            "complete discharge for",
            &[CareStatus::DischargeStarted],
            CareStatus::Discharged,
        )?;
        self.discharge_date = Some(today);
        Ok(())
    }

    fn transition(
        &mut self,
        action: &'static str,
        from: &[CareStatus],
        to: CareStatus,
    ) -> CaresResult<()> {
        if !from.contains(&self.status) {
            return Err(CaresError::InvalidTransition {
                action,
                status: self.status.name(),
            });
        }
        tracing::debug!(patient = %self.patient_id, from = %self.status, %to, "care status change");
        self.status = to;
        Ok(())
    }
}

/// A patient field that can be edited from a form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatientField {
    FirstName,
    LastName,
    Dob,
    Address,
    Phone,
    Insurance,
    EmergencyContact,
    BloodPressure,
    Height,
    Weight,
    HeartRate,
    OxygenLevel,
    BodyTemp,
    DischargeInstructions,
}

impl PatientField {
    pub const ALL: [PatientField; 14] = [
        PatientField::FirstName,
        PatientField::LastName,
        PatientField::Dob,
        PatientField::Address,
        PatientField::Phone,
        PatientField::Insurance,
        PatientField::EmergencyContact,
        PatientField::BloodPressure,
        PatientField::Height,
        PatientField::Weight,
        PatientField::HeartRate,
        PatientField::OxygenLevel,
        PatientField::BodyTemp,
        PatientField::DischargeInstructions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PatientField::FirstName => "first-name",
            PatientField::LastName => "last-name",
            PatientField::Dob => "dob",
            PatientField::Address => "address",
            PatientField::Phone => "phone",
            PatientField::Insurance => "insurance",
            PatientField::EmergencyContact => "emergency-contact",
            PatientField::BloodPressure => "blood-pressure",
            PatientField::Height => "height",
            PatientField::Weight => "weight",
            PatientField::HeartRate => "heart-rate",
            PatientField::OxygenLevel => "oxygen-level",
            PatientField::BodyTemp => "body-temp",
            PatientField::DischargeInstructions => "discharge-instructions",
        }
    }

    /// Whether editing this field changes the patient's table key.
    pub fn is_identity(self) -> bool {
        matches!(
            self,
            PatientField::FirstName | PatientField::LastName | PatientField::Dob
        )
    }

    pub fn required_capability(self) -> Capability {
        match self {
            PatientField::FirstName
            | PatientField::LastName
            | PatientField::Dob
            | PatientField::Address
            | PatientField::Phone
            | PatientField::Insurance
            | PatientField::EmergencyContact => Capability::EditBasicInfo,
            PatientField::BloodPressure
            | PatientField::Height
            | PatientField::Weight
            | PatientField::HeartRate
            | PatientField::OxygenLevel
            | PatientField::BodyTemp => Capability::EditMedicalInfo,
            PatientField::DischargeInstructions => Capability::EditDischarge,
        }
    }

    /// Runs the field's setter. On error the patient is unchanged.
    pub fn apply(self, patient: &mut Patient, value: &str) -> Result<(), ValidationError> {
        match self {
            PatientField::FirstName => patient.person.set_first_name(value),
            PatientField::LastName => patient.person.set_last_name(value),
            PatientField::Dob => patient.person.set_dob(value),
            PatientField::Address => {
                patient.person.set_address(value);
                Ok(())
            }
            PatientField::Phone => patient.person.set_phone(value),
            PatientField::Insurance => {
                patient.set_insurance_plan(value);
                Ok(())
            }
            PatientField::EmergencyContact => patient.set_emergency_contact(value),
            PatientField::BloodPressure => patient.vitals.set_blood_pressure(value),
            PatientField::Height => patient.vitals.set_height(value),
            PatientField::Weight => patient.vitals.set_weight(value),
            PatientField::HeartRate => patient.vitals.set_heart_rate(value),
            PatientField::OxygenLevel => patient.vitals.set_oxygen_level(value),
            PatientField::BodyTemp => patient.vitals.set_body_temp(value),
            PatientField::DischargeInstructions => {
                patient.set_discharge_instruction(value);
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for PatientField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for PatientField {
    type Err = CaresError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CaresError::InvalidInput(format!("unknown patient field: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn jane() -> Patient {
        let person =
            Person::parse("Doe", "Jane", "01/01/1990", "1 Main St", "555-123-4567").unwrap();
        Patient::new(person, "Acme Health", None, day(2024, 3, 1))
    }

    #[test]
    fn new_patient_is_checked_in_with_fresh_panels() {
        let patient = jane();
        assert_eq!(patient.patient_id(), "DoeJane01/01/1990");
        assert_eq!(patient.status(), CareStatus::CheckedIn);
        assert_eq!(patient.admitted_date(), day(2024, 3, 1));
        assert_eq!(patient.discharge_date(), None);
        assert_eq!(patient.lab_panel().total_cost(), 0.0);
        assert_eq!(patient.diagnosis().is_diagnosed(), [false; 5]);
        assert_eq!(patient.vitals().height(), None);
    }

    #[test]
    fn full_stay_walks_every_status() {
        let mut patient = jane();
        patient.admit(day(2024, 3, 2)).unwrap();
        assert_eq!(patient.admitted_date(), day(2024, 3, 2));

        patient.start_discharge().unwrap();
        patient.complete_discharge(day(2024, 3, 5)).unwrap();

        assert!(patient.is_discharged());
        assert_eq!(patient.discharge_date(), Some(day(2024, 3, 5)));
        assert_eq!(patient.stay_days(day(2030, 1, 1)), 3);
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut patient = jane();
        assert!(matches!(
            patient.complete_discharge(day(2024, 3, 2)),
            Err(CaresError::InvalidTransition { status: "checked in", .. })
        ));

        patient.start_discharge().unwrap();
        assert!(patient.admit(day(2024, 3, 2)).is_err());
        assert!(patient.start_discharge().is_err());
        assert_eq!(patient.status(), CareStatus::DischargeStarted);
        assert_eq!(patient.admitted_date(), day(2024, 3, 1));
    }

    #[test]
    fn stay_days_runs_to_today_and_never_goes_negative() {
        let patient = jane();
        assert_eq!(patient.stay_days(day(2024, 3, 4)), 3);
        assert_eq!(patient.stay_days(day(2024, 2, 1)), 0);
    }

    #[test]
    fn fields_parse_from_kebab_case() {
        assert_eq!(
            "blood-pressure".parse::<PatientField>().unwrap(),
            PatientField::BloodPressure
        );
        assert_eq!(
            "first-name".parse::<PatientField>().unwrap(),
            PatientField::FirstName
        );
        assert!("shoe-size".parse::<PatientField>().is_err());

        for field in PatientField::ALL {
            assert_eq!(field.name().parse::<PatientField>().unwrap(), field);
        }
    }

    #[test]
    fn only_name_and_dob_are_identity_fields() {
        let identity: Vec<PatientField> = PatientField::ALL
            .into_iter()
            .filter(|f| f.is_identity())
            .collect();
        assert_eq!(
            identity,
            [
                PatientField::FirstName,
                PatientField::LastName,
                PatientField::Dob
            ]
        );
        assert_eq!(
            PatientField::Height.required_capability(),
            Capability::EditMedicalInfo
        );
        assert_eq!(
            PatientField::DischargeInstructions.required_capability(),
            Capability::EditDischarge
        );
    }

    #[test]
    fn apply_routes_to_the_right_setter() {
        let mut patient = jane();
        PatientField::Weight.apply(&mut patient, "150").unwrap();
        PatientField::Height.apply(&mut patient, "70").unwrap();
        PatientField::EmergencyContact
            .apply(&mut patient, "555-000-1111")
            .unwrap();
        PatientField::Insurance.apply(&mut patient, "None").unwrap();

        assert_eq!(patient.vitals().body_mass_index(), Some(21.52));
        assert_eq!(patient.emergency_contact(), "555-000-1111");
        assert_eq!(patient.insurance_plan(), "None");

        assert_eq!(
            PatientField::EmergencyContact.apply(&mut patient, "555"),
            Err(ValidationError::InvalidPhone)
        );
        assert_eq!(patient.emergency_contact(), "555-000-1111");
    }

    #[test]
    fn identity_edit_does_not_touch_patient_id() {
        let mut patient = jane();
        PatientField::LastName.apply(&mut patient, "Smith").unwrap();
        assert_eq!(patient.person().record_key(), "SmithJane01/01/1990");
        assert_eq!(patient.patient_id(), "DoeJane01/01/1990");
    }
}
