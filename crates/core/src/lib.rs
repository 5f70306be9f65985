//! # C.A.R.E.S. Core
//!
//! Record keeping for a hospital front desk.
//!
//! This crate contains the data model and the rules around it:
//! - Staff accounts, roles and the capabilities each role holds
//! - Patient records with vitals, a fixed lab panel and diagnoses
//! - The [`Database`] of logins and patients, persisted as two YAML snapshots
//! - A [`WarningManager`] broadcasting validation failures and notices
//! - A [`DeskSession`] running the role-gated desk workflow
//!
//! **No front-end concerns**: argument parsing, terminal output and process
//! setup belong in `cares-cli`.

pub mod bill;
pub mod capability;
pub mod config;
pub mod constants;
pub mod database;
pub mod diagnosis;
pub mod error;
pub mod labs;
pub mod patient;
pub mod person;
pub mod session;
pub mod staff;
pub mod validation;
pub mod vitals;
pub mod warnings;

pub use bill::render_bill;
pub use capability::Capability;
pub use config::{resolve_data_dir, CaresConfig};
pub use database::Database;
pub use diagnosis::{Administration, Condition, ConditionKind, Diagnosis, Medication, Prescription};
pub use error::{CaresError, CaresResult};
pub use labs::{Lab, LabKind, LabPanel, LabResult};
pub use patient::{CareStatus, Patient, PatientField};
pub use person::Person;
pub use session::{CheckInForm, DeskSession};
pub use staff::{Staff, StaffRole};
pub use vitals::Vitals;
pub use warnings::{CollectingListener, ListenerId, WarningListener, WarningManager};

pub use cares_types::{
    BloodPressure, DateOfBirth, NonEmptyText, PersonName, PhoneNumber, ValidationError,
};
