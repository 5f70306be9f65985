//! What each staff role may do at the desk.

/// A single permission checked before a workflow action runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    SearchPatients,
    CheckInPatient,
    EditBasicInfo,
    EditMedicalInfo,
    RunLabs,
    AdmitPatient,
    StartDischarge,
    CompleteDischarge,
    EditDischarge,
    Diagnose,
    ViewDischarged,
    ViewBill,
}

impl Capability {
    /// Verb phrase used in permission errors.
    pub fn describe(self) -> &'static str {
        match self {
            Capability::SearchPatients => "search patients",
            Capability::CheckInPatient => "check in patients",
            Capability::EditBasicInfo => "edit basic information",
            Capability::EditMedicalInfo => "edit medical information",
            Capability::RunLabs => "run labs",
            Capability::AdmitPatient => "admit patients",
            Capability::StartDischarge => "start discharges",
            Capability::CompleteDischarge => "complete discharges",
            Capability::EditDischarge => "edit discharge instructions",
            Capability::Diagnose => "diagnose or prescribe",
            Capability::ViewDischarged => "view discharged patients",
            Capability::ViewBill => "view bills",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

pub(crate) const EMERGENCY_ROOM_STAFF: &[Capability] =
    &[Capability::CheckInPatient, Capability::EditBasicInfo];

pub(crate) const NURSE: &[Capability] = &[
    Capability::SearchPatients,
    Capability::EditBasicInfo,
    Capability::EditMedicalInfo,
    Capability::RunLabs,
    Capability::AdmitPatient,
    Capability::StartDischarge,
    Capability::EditDischarge,
];

pub(crate) const DOCTOR: &[Capability] = &[
    Capability::SearchPatients,
    Capability::EditBasicInfo,
    Capability::EditMedicalInfo,
    Capability::RunLabs,
    Capability::AdmitPatient,
    Capability::StartDischarge,
    Capability::EditDischarge,
    Capability::CompleteDischarge,
    Capability::Diagnose,
];

pub(crate) const BILLING_STAFF: &[Capability] = &[
    Capability::SearchPatients,
    Capability::ViewDischarged,
    Capability::ViewBill,
];
