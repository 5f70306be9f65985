use crate::capability::Capability;
use crate::diagnosis::ConditionKind;
use crate::staff::StaffRole;
use cares_types::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum CaresError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("No patient found!")]
    PatientNotFound(String),
    #[error("This patient already exists")]
    DuplicatePatient(String),
    #[error("There is already a patient with this information in the system")]
    KeyConflict { old_key: String, new_key: String },
    #[error("Patient has been discharged")]
    PatientDischarged,
    #[error("No patient selected")]
    NoPatientSelected,
    #[error("Please fill all fields (missing {0})")]
    MissingField(&'static str),
    #[error("Please enter a valid search (lastname, firstname), (00/00/0000)")]
    InvalidSearch,
    #[error("cannot {action} a patient whose status is {status}")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },

    #[error("Incorrect Username or Password")]
    LoginFailed,
    #[error("{role} staff are not permitted to {capability}")]
    NotPermitted {
        role: StaffRole,
        capability: Capability,
    },

    #[error("lab index {0} is out of range (0-9)")]
    InvalidLabIndex(usize),
    #[error("condition index {0} is out of range (0-4)")]
    InvalidConditionIndex(usize),
    #[error("prescription slot {0} is out of range (0-2)")]
    InvalidPrescriptionSlot(usize),
    #[error("{0} must be diagnosed before its prescriptions can be selected")]
    ConditionNotDiagnosed(ConditionKind),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read data file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write data file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(String),
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshotVersion { found: u32, expected: u32 },
}

pub type CaresResult<T> = std::result::Result<T, CaresError>;
