//! The logged-in desk workflow.
//!
//! A [`DeskSession`] ties one staff member to the [`Database`] and the
//! [`WarningManager`] for the length of a shift. Every action checks the staff
//! member's role first, works on the currently selected patient where it needs
//! one, and reports failures through the warning channel as well as returning
//! them.

use crate::bill::render_bill;
use crate::capability::Capability;
use crate::database::Database;
use crate::diagnosis::ConditionKind;
use crate::labs::{LabKind, LabResult};
use crate::patient::{Patient, PatientField};
use crate::person::Person;
use crate::staff::Staff;
use crate::validation::parse_search_query;
use crate::warnings::WarningManager;
use crate::{CaresError, CaresResult};
use cares_types::PhoneNumber;
use chrono::NaiveDate;
use rand::Rng;

const CHECKED_IN: &str = "Patient Checked-In!";
const ADMITTED: &str = "Patient has been Admitted";
const DISCHARGE_STARTED: &str = "Discharge has been started";
const DISCHARGE_COMPLETE: &str = "Discharge Complete";

/// Raw check-in form input. Every field is required.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckInForm {
    pub last_name: String,
    pub first_name: String,
    pub dob: String,
    pub address: String,
    pub phone: String,
    pub insurance_plan: String,
    pub emergency_contact: String,
}

impl CheckInForm {
    fn check_complete(&self) -> CaresResult<()> {
        let fields = [
            ("last name", &self.last_name),
            ("first name", &self.first_name),
            ("date of birth", &self.dob),
            ("address", &self.address),
            ("phone", &self.phone),
            ("insurance plan", &self.insurance_plan),
            ("emergency contact", &self.emergency_contact),
        ];
        match fields.into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(CaresError::MissingField(name)),
            None => Ok(()),
        }
    }

    fn into_patient(self, today: NaiveDate) -> CaresResult<Patient> {
        self.check_complete()?;
        let person = Person::parse(
            self.last_name.trim(),
            self.first_name.trim(),
            self.dob.trim(),
            self.address.trim(),
            self.phone.trim(),
        )?;
        let emergency_contact = PhoneNumber::new(self.emergency_contact.trim())?;
        Ok(Patient::new(
            person,
            self.insurance_plan.trim(),
            Some(emergency_contact),
            today,
        ))
    }
}

pub struct DeskSession<'a> {
    db: &'a mut Database,
    warnings: &'a WarningManager,
    staff: Staff,
    today: NaiveDate,
    current: Option<String>,
}

impl std::fmt::Debug for DeskSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeskSession")
            .field("staff", &self.staff.username())
            .field("role", &self.staff.role())
            .field("today", &self.today)
            .field("current", &self.current)
            .finish()
    }
}

impl<'a> DeskSession<'a> {
    /// Starts a session for the staff member with these credentials.
    ///
    /// `today` is the date stamped on check-ins, admissions and discharges.
    ///
    /// # Errors
    ///
    /// Returns `CaresError::LoginFailed` if no account matches.
    pub fn login(
        db: &'a mut Database,
        warnings: &'a WarningManager,
        username: &str,
        password: &str,
        today: NaiveDate,
    ) -> CaresResult<Self> {
        let Some(staff) = db.login(username, password).cloned() else {
            let err = CaresError::LoginFailed;
            warnings.show_warning_to_all(&err.to_string());
            return Err(err);
        };

        tracing::info!(username = staff.username(), role = %staff.role(), "staff logged in");
        Ok(Self {
            db,
            warnings,
            staff,
            today,
            current: None,
        })
    }

    pub fn staff(&self) -> &Staff {
        &self.staff
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn current_patient(&self) -> Option<&Patient> {
        self.current.as_deref().and_then(|key| self.db.patient(key))
    }

    pub fn clear_selection(&mut self) {
        self.current = None;
    }

    /// Finds a patient by `Last, First` and date of birth and selects them.
    ///
    /// The previous selection is dropped first, so a failed search leaves no
    /// patient selected.
    ///
    /// # Errors
    ///
    /// - `InvalidSearch` if the query is malformed.
    /// - `PatientNotFound` if nobody matches.
    /// - `PatientDischarged` if the patient has left and this role may not see
    ///   discharged patients.
    pub fn search_patient(&mut self, name: &str, dob: &str) -> CaresResult<&Patient> {
        self.current = None;
        let key = self.report(self.find_patient(name, dob))?;
        self.current = Some(key);
        self.selected()
    }

    /// Patients this role may see, in key order.
    pub fn visible_patients(&self) -> CaresResult<Vec<&Patient>> {
        self.report(self.require(Capability::SearchPatients))?;
        let show_discharged = self.staff.can(Capability::ViewDischarged);
        Ok(self
            .db
            .patients()
            .filter(|p| show_discharged || !p.is_discharged())
            .collect())
    }

    /// Registers a new patient from the check-in form and selects them.
    pub fn check_in(&mut self, form: CheckInForm) -> CaresResult<&Patient> {
        let result = self.try_check_in(form);
        let key = self.report(result)?;
        self.current = Some(key);
        self.notify(CHECKED_IN);
        self.selected()
    }

    pub fn admit(&mut self) -> CaresResult<()> {
        let today = self.today;
        let result = self.with_selected(Capability::AdmitPatient, |p| p.admit(today));
        self.report(result)?;
        self.notify(ADMITTED);
        Ok(())
    }

    pub fn start_discharge(&mut self) -> CaresResult<()> {
        let result = self.with_selected(Capability::StartDischarge, Patient::start_discharge);
        self.report(result)?;
        self.notify(DISCHARGE_STARTED);
        Ok(())
    }

    pub fn complete_discharge(&mut self) -> CaresResult<()> {
        let today = self.today;
        let result =
            self.with_selected(Capability::CompleteDischarge, |p| p.complete_discharge(today));
        self.report(result)?;
        self.notify(DISCHARGE_COMPLETE);
        Ok(())
    }

    /// Applies a form edit to the selected patient.
    ///
    /// Editing a name or the date of birth moves the record to its new key. If
    /// another patient already holds that key the edit is undone and
    /// `KeyConflict` is returned.
    pub fn update_field(&mut self, field: PatientField, value: &str) -> CaresResult<()> {
        let result = self.try_update_field(field, value);
        self.report(result)
    }

    /// Runs each lab once, in the order given, and returns the outcomes.
    pub fn run_labs<R: Rng + ?Sized>(
        &mut self,
        kinds: &[LabKind],
        rng: &mut R,
    ) -> CaresResult<Vec<LabResult>> {
        let result = self.with_selected(Capability::RunLabs, |p| {
            Ok(kinds
                .iter()
                .map(|kind| p.lab_panel_mut().run_lab(*kind, &mut *rng))
                .collect::<Vec<_>>())
        });
        self.report(result)
    }

    pub fn reset_lab(&mut self, kind: LabKind) -> CaresResult<LabResult> {
        let result = self.with_selected(Capability::RunLabs, |p| {
            Ok(p.lab_panel_mut().reset_lab(kind))
        });
        self.report(result)
    }

    pub fn lab_results(&self) -> CaresResult<[&'static str; crate::constants::LAB_COUNT]> {
        let patient = self.report(self.selected())?;
        Ok(patient.lab_panel().current_results())
    }

    pub fn set_diagnosed(&mut self, kind: ConditionKind, diagnosed: bool) -> CaresResult<()> {
        let result = self.with_selected(Capability::Diagnose, |p| {
            p.diagnosis_mut().set_is_diagnosed(kind, diagnosed);
            Ok(())
        });
        self.report(result)
    }

    pub fn set_prescribed(
        &mut self,
        kind: ConditionKind,
        slot: usize,
        prescribed: bool,
    ) -> CaresResult<()> {
        let result = self.with_selected(Capability::Diagnose, |p| {
            p.diagnosis_mut().set_prescribed(kind, slot, prescribed)
        });
        self.report(result)
    }

    /// The selected patient's bill, as of today.
    pub fn bill(&self) -> CaresResult<String> {
        self.report(self.require(Capability::ViewBill))?;
        let patient = self.report(self.selected())?;
        Ok(render_bill(patient, self.today))
    }

    fn find_patient(&self, name: &str, dob: &str) -> CaresResult<String> {
        self.require(Capability::SearchPatients)?;
        let query = parse_search_query(name, dob)?;
        let key = query.key();
        let patient = self
            .db
            .patient(&key)
            .ok_or_else(|| CaresError::PatientNotFound(key.clone()))?;
        if patient.is_discharged() && !self.staff.can(Capability::ViewDischarged) {
            return Err(CaresError::PatientDischarged);
        }
        Ok(key)
    }

    fn try_check_in(&mut self, form: CheckInForm) -> CaresResult<String> {
        self.require(Capability::CheckInPatient)?;
        let patient = form.into_patient(self.today)?;
        let key = patient.patient_id().to_string();
        self.db.insert_patient(patient)?;
        Ok(key)
    }

    fn try_update_field(&mut self, field: PatientField, value: &str) -> CaresResult<()> {
        self.require(field.required_capability())?;
        let old_key = self.current_key()?.to_string();
        let patient = self.selected_mut()?;
        let previous = patient.person().clone();
        field.apply(patient, value)?;
        tracing::debug!(patient = %old_key, %field, "patient field updated");

        if !field.is_identity() {
            return Ok(());
        }

        let new_key = patient.person().record_key();
        if let Err(err) = self.db.update_key(&old_key, &new_key) {
            if let Some(patient) = self.db.patient_mut(&old_key) {
                *patient.person_mut() = previous;
            }
            return Err(err);
        }
        self.current = Some(new_key);
        Ok(())
    }

    fn with_selected<T>(
        &mut self,
        capability: Capability,
        action: impl FnOnce(&mut Patient) -> CaresResult<T>,
    ) -> CaresResult<T> {
        self.require(capability)?;
        action(self.selected_mut()?)
    }

    fn require(&self, capability: Capability) -> CaresResult<()> {
        if self.staff.can(capability) {
            Ok(())
        } else {
            Err(CaresError::NotPermitted {
                role: self.staff.role(),
                capability,
            })
        }
    }

    fn current_key(&self) -> CaresResult<&str> {
        self.current.as_deref().ok_or(CaresError::NoPatientSelected)
    }

    fn selected(&self) -> CaresResult<&Patient> {
        let key = self.current_key()?;
        self.db
            .patient(key)
            .ok_or_else(|| CaresError::PatientNotFound(key.to_string()))
    }

    /// The selected patient, for editing. Discharged records are read-only.
    fn selected_mut(&mut self) -> CaresResult<&mut Patient> {
        let key = self.current.as_deref().ok_or(CaresError::NoPatientSelected)?;
        let patient = self
            .db
            .patient_mut(key)
            .ok_or_else(|| CaresError::PatientNotFound(key.to_string()))?;
        if patient.is_discharged() {
            return Err(CaresError::PatientDischarged);
        }
        Ok(patient)
    }

    fn report<T>(&self, result: CaresResult<T>) -> CaresResult<T> {
        if let Err(err) = &result {
            self.warnings.show_warning_to_all(&err.to_string());
        }
        result
    }

    fn notify(&self, message: &str) {
        self.warnings.show_warning_to_all(message);
    }
}
