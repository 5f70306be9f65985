//! The desk's two tables and their snapshot files.
//!
//! The [`Database`] keeps staff logins and patients in memory, keyed the way
//! the desk looks them up:
//!
//! - login table: `username + password`
//! - patient table: `last_name + first_name + dob`
//!
//! Each table is written to its own YAML file under the configured data
//! directory when the desk shuts down, and read back at start-up:
//!
//! ```text
//! <data_dir>/
//!   login_data.yaml     # { version: 1, entries: { key: staff } }
//!   patient_data.yaml   # { version: 1, entries: { key: patient } }
//! ```
//!
//! There is no write-ahead log and no locking; a crash between the two writes
//! leaves the files from different points in time.

use crate::config::CaresConfig;
use crate::constants::SNAPSHOT_VERSION;
use crate::patient::Patient;
use crate::person::record_key;
use crate::staff::{login_key, seed_accounts, Staff};
use crate::{CaresError, CaresResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    version: u32,
    entries: &'a BTreeMap<String, T>,
}

#[derive(Deserialize)]
struct Snapshot<T> {
    #[allow(dead_code)]
    version: u32,
    entries: BTreeMap<String, T>,
}

#[derive(Deserialize)]
struct SnapshotVersion {
    version: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Database {
    login_table: BTreeMap<String, Staff>,
    patient_table: BTreeMap<String, Patient>,
}

impl Database {
    /// An empty database: no staff, no patients.
    pub fn new() -> Self {
        Self::default()
    }

    /// A database holding only the default staff accounts.
    pub fn with_default_staff() -> Self {
        Self {
            login_table: default_login_table(),
            patient_table: BTreeMap::new(),
        }
    }

    /// Loads both tables from the data directory.
    ///
    /// Loading never fails. A missing login file yields the default staff and a
    /// missing patient file an empty patient table. A file that cannot be read
    /// or parsed is logged and replaced by the same defaults. The two files are
    /// loaded independently, so a damaged login file does not lose patients.
    pub fn load(cfg: &CaresConfig) -> Self {
        let login_path = cfg.login_data_path();
        let login_table = match read_snapshot::<Staff>(&login_path) {
            Ok(Some(entries)) => entries
                .into_values()
                .map(|staff| (staff.login_key(), staff))
                .collect(),
            Ok(None) => {
                tracing::info!(path = %login_path.display(), "no login data, seeding default staff");
                default_login_table()
            }
            Err(err) => {
                tracing::warn!(
                    path = %login_path.display(),
                    error = %err,
                    "login data unusable, falling back to default staff"
                );
                default_login_table()
            }
        };

        let patient_path = cfg.patient_data_path();
        let patient_table = match read_snapshot::<Patient>(&patient_path) {
            Ok(Some(mut entries)) => {
                for (key, patient) in entries.iter_mut() {
                    if patient.patient_id() != key {
                        tracing::warn!(
                            key = %key,
                            patient_id = %patient.patient_id(),
                            "patient id does not match its table key, using the key"
                        );
                        patient.set_patient_id(key.clone());
                    }
                }
                entries
            }
            Ok(None) => {
                tracing::info!(path = %patient_path.display(), "no patient data, starting empty");
                BTreeMap::new()
            }
            Err(err) => {
                tracing::warn!(
                    path = %patient_path.display(),
                    error = %err,
                    "patient data unusable, starting with no patients"
                );
                BTreeMap::new()
            }
        };

        tracing::info!(
            staff = login_table.len(),
            patients = patient_table.len(),
            "database loaded"
        );

        Self {
            login_table,
            patient_table,
        }
    }

    /// Writes the login snapshot, then the patient snapshot.
    ///
    /// # Errors
    ///
    /// - `StorageDirCreation` if the data directory cannot be created.
    /// - `YamlSerialization` or `FileWrite` if either snapshot cannot be written.
    ///   The login file may already have been replaced when the patient write
    ///   fails.
    pub fn save(&self, cfg: &CaresConfig) -> CaresResult<()> {
        fs::create_dir_all(cfg.data_dir()).map_err(CaresError::StorageDirCreation)?;

        write_snapshot(&cfg.login_data_path(), &self.login_table)?;
        write_snapshot(&cfg.patient_data_path(), &self.patient_table)?;

        tracing::info!(
            data_dir = %cfg.data_dir().display(),
            staff = self.login_table.len(),
            patients = self.patient_table.len(),
            "database saved"
        );
        Ok(())
    }

    /// Looks up a staff account by its credentials.
    pub fn login(&self, username: &str, password: &str) -> Option<&Staff> {
        self.login_table.get(&login_key(username, password))
    }

    /// Adds a patient under its patient id.
    ///
    /// # Errors
    ///
    /// Returns `CaresError::DuplicatePatient` if the key is taken; the table is
    /// unchanged.
    pub fn insert_patient(&mut self, patient: Patient) -> CaresResult<()> {
        let key = patient.patient_id().to_string();
        if self.patient_table.contains_key(&key) {
            return Err(CaresError::DuplicatePatient(key));
        }
        tracing::debug!(patient = %key, "patient inserted");
        self.patient_table.insert(key, patient);
        Ok(())
    }

    pub fn patient(&self, key: &str) -> Option<&Patient> {
        self.patient_table.get(key)
    }

    pub fn patient_mut(&mut self, key: &str) -> Option<&mut Patient> {
        self.patient_table.get_mut(key)
    }

    pub fn search_patient(&self, last_name: &str, first_name: &str, dob: &str) -> Option<&Patient> {
        self.patient(&record_key(last_name, first_name, dob))
    }

    /// Every patient, in key order.
    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.patient_table.values()
    }

    pub fn login_table(&self) -> &BTreeMap<String, Staff> {
        &self.login_table
    }

    pub fn patient_table(&self) -> &BTreeMap<String, Patient> {
        &self.patient_table
    }

    /// Moves a patient record from `old_key` to `new_key` and updates its
    /// patient id.
    ///
    /// # Errors
    ///
    /// - `PatientNotFound` if nothing is stored under `old_key`.
    /// - `KeyConflict` if another record already uses `new_key`. Nothing moves.
    pub fn update_key(&mut self, old_key: &str, new_key: &str) -> CaresResult<()> {
        if old_key == new_key {
            return Ok(());
        }
        if self.patient_table.contains_key(new_key) {
            if !self.patient_table.contains_key(old_key) {
                return Err(CaresError::PatientNotFound(old_key.to_string()));
            }
            return Err(CaresError::KeyConflict {
                old_key: old_key.to_string(),
                new_key: new_key.to_string(),
            });
        }

        let mut patient = self
            .patient_table
            .remove(old_key)
            .ok_or_else(|| CaresError::PatientNotFound(old_key.to_string()))?;
        patient.set_patient_id(new_key.to_string());
        self.patient_table.insert(new_key.to_string(), patient);

        tracing::debug!(old_key, new_key, "patient rekeyed");
        Ok(())
    }
}

fn default_login_table() -> BTreeMap<String, Staff> {
    match seed_accounts() {
        Ok(accounts) => accounts
            .into_iter()
            .map(|staff| (staff.login_key(), staff))
            .collect(),
        Err(err) => {
            tracing::error!(error = %err, "default staff accounts failed validation");
            BTreeMap::new()
        }
    }
}

/// Reads one snapshot file. `Ok(None)` means the file does not exist.
fn read_snapshot<T: DeserializeOwned>(path: &Path) -> CaresResult<Option<BTreeMap<String, T>>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(CaresError::FileRead(err)),
    };

    let probe: SnapshotVersion = serde_yaml::from_str(&text)
        .map_err(|e| CaresError::YamlDeserialization(format!("snapshot header: {e}")))?;
    if probe.version != SNAPSHOT_VERSION {
        return Err(CaresError::UnsupportedSnapshotVersion {
            found: probe.version,
            expected: SNAPSHOT_VERSION,
        });
    }

    let deserializer = serde_yaml::Deserializer::from_str(&text);
    match serde_path_to_error::deserialize::<_, Snapshot<T>>(deserializer) {
        Ok(snapshot) => Ok(Some(snapshot.entries)),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() {
                "<root>"
            } else {
                path.as_str()
            };
            Err(CaresError::YamlDeserialization(format!(
                "snapshot schema mismatch at {path}: {source}"
            )))
        }
    }
}

fn write_snapshot<T: Serialize>(path: &Path, entries: &BTreeMap<String, T>) -> CaresResult<()> {
    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        entries,
    };
    let text = serde_yaml::to_string(&snapshot).map_err(CaresError::YamlSerialization)?;
    fs::write(path, text).map_err(CaresError::FileWrite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labs::LabKind;
    use crate::person::Person;
    use crate::staff::StaffRole;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn patient(last: &str, first: &str, dob: &str) -> Patient {
        let person = Person::parse(last, first, dob, "1 Main St", "555-123-4567").unwrap();
        Patient::new(person, "Acme Health", None, today())
    }

    fn config(dir: &TempDir) -> CaresConfig {
        CaresConfig::new(dir.path().join("data")).unwrap()
    }

    #[test]
    fn default_staff_can_log_in() {
        let db = Database::with_default_staff();
        assert_eq!(db.login_table().len(), 4);
        assert_eq!(
            db.login("Doctor", "123").map(Staff::role),
            Some(StaffRole::Doctor)
        );
        assert!(db.login("Doctor", "1234").is_none());
        assert!(Database::new().login("Doctor", "123").is_none());
    }

    #[test]
    fn insert_rejects_duplicate_keys() {
        let mut db = Database::new();
        db.insert_patient(patient("Doe", "Jane", "01/01/1990")).unwrap();

        let mut other = patient("Doe", "Jane", "01/01/1990");
        other.set_insurance_plan("Other");
        assert!(matches!(
            db.insert_patient(other),
            Err(CaresError::DuplicatePatient(key)) if key == "DoeJane01/01/1990"
        ));
        assert_eq!(
            db.search_patient("Doe", "Jane", "01/01/1990")
                .map(Patient::insurance_plan),
            Some("Acme Health")
        );
    }

    #[test]
    fn update_key_moves_record_to_free_key() {
        let mut db = Database::new();
        db.insert_patient(patient("Doe", "Jane", "01/01/1990")).unwrap();

        db.update_key("DoeJane01/01/1990", "SmithJane01/01/1990")
            .unwrap();

        assert!(db.patient("DoeJane01/01/1990").is_none());
        let moved = db.patient("SmithJane01/01/1990").unwrap();
        assert_eq!(moved.patient_id(), "SmithJane01/01/1990");
    }

    #[test]
    fn update_key_conflict_keeps_both_records() {
        let mut db = Database::new();
        db.insert_patient(patient("Doe", "Jane", "01/01/1990")).unwrap();
        db.insert_patient(patient("Smith", "Jane", "01/01/1990"))
            .unwrap();

        let err = db
            .update_key("DoeJane01/01/1990", "SmithJane01/01/1990")
            .unwrap_err();

        assert!(matches!(err, CaresError::KeyConflict { .. }));
        assert_eq!(
            db.patient("DoeJane01/01/1990").map(|p| p.person().last_name()),
            Some("Doe")
        );
        assert_eq!(
            db.patient("SmithJane01/01/1990")
                .map(|p| p.person().last_name()),
            Some("Smith")
        );
    }

    #[test]
    fn update_key_edge_cases() {
        let mut db = Database::new();
        db.insert_patient(patient("Doe", "Jane", "01/01/1990")).unwrap();

        db.update_key("DoeJane01/01/1990", "DoeJane01/01/1990")
            .unwrap();
        assert!(db.patient("DoeJane01/01/1990").is_some());

        assert!(matches!(
            db.update_key("NobodyHere01/01/1990", "SomebodyElse01/01/1990"),
            Err(CaresError::PatientNotFound(_))
        ));
        assert!(matches!(
            db.update_key("NobodyHere01/01/1990", "DoeJane01/01/1990"),
            Err(CaresError::PatientNotFound(_))
        ));
    }

    #[test]
    fn save_then_load_round_trips_both_tables() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir);

        let mut db = Database::with_default_staff();
        let mut jane = patient("Doe", "Jane", "01/01/1990");
        let mut rng = StdRng::seed_from_u64(11);
        jane.lab_panel_mut().run_lab(LabKind::XRay, &mut rng);
        jane.vitals_mut().set_blood_pressure("120/80").unwrap();
        jane.vitals_mut().set_height("64.5").unwrap();
        jane.diagnosis_mut()
            .set_is_diagnosed(crate::diagnosis::ConditionKind::LiverDisease, true);
        jane.admit(today()).unwrap();
        db.insert_patient(jane).unwrap();
        db.insert_patient(patient("Roe", "Rick", "12/31/1975")).unwrap();

        db.save(&cfg).unwrap();
        let loaded = Database::load(&cfg);

        assert_eq!(
            loaded.login_table().keys().collect::<Vec<_>>(),
            db.login_table().keys().collect::<Vec<_>>()
        );
        assert_eq!(loaded.login_table(), db.login_table());
        assert_eq!(loaded.patient_table(), db.patient_table());
    }

    #[test]
    fn missing_files_load_defaults() {
        let dir = TempDir::new().unwrap();
        let db = Database::load(&config(&dir));
        assert_eq!(db.login_table().len(), 4);
        assert!(db.patient_table().is_empty());
    }

    #[test]
    fn corrupt_login_file_does_not_lose_patients() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir);
        let mut db = Database::new();
        db.insert_patient(patient("Doe", "Jane", "01/01/1990")).unwrap();
        db.save(&cfg).unwrap();

        fs::write(cfg.login_data_path(), "version: 1\nentries: [not, a, map]\n").unwrap();
        let loaded = Database::load(&cfg);

        assert!(loaded.login("Nurse", "123").is_some());
        assert!(loaded.patient("DoeJane01/01/1990").is_some());
    }

    #[test]
    fn corrupt_patient_file_keeps_staff() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir);
        Database::with_default_staff().save(&cfg).unwrap();

        fs::write(cfg.patient_data_path(), ":: not yaml ::\n\t-").unwrap();
        let loaded = Database::load(&cfg);

        assert_eq!(loaded.login_table().len(), 4);
        assert!(loaded.patient_table().is_empty());
    }

    #[test]
    fn unknown_snapshot_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patient_data.yaml");
        fs::write(&path, "version: 2\nentries: {}\n").unwrap();

        assert!(matches!(
            read_snapshot::<Patient>(&path),
            Err(CaresError::UnsupportedSnapshotVersion {
                found: 2,
                expected: 1
            })
        ));
    }

    #[test]
    fn load_falls_back_to_defaults_on_unknown_versions() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir);
        fs::create_dir_all(cfg.data_dir()).unwrap();
        fs::write(cfg.login_data_path(), "version: 2\nentries: {}\n").unwrap();
        fs::write(cfg.patient_data_path(), "version: 2\nentries: {}\n").unwrap();

        let loaded = Database::load(&cfg);

        assert_eq!(loaded.login_table().len(), 4);
        assert!(loaded.login("Doctor", "123").is_some());
        assert!(loaded.patient_table().is_empty());
    }

    #[test]
    fn parse_errors_name_the_failing_field() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir);
        let mut db = Database::new();
        db.insert_patient(patient("Doe", "Jane", "01/01/1990")).unwrap();
        db.save(&cfg).unwrap();

        let text = fs::read_to_string(cfg.patient_data_path()).unwrap();
        fs::write(
            cfg.patient_data_path(),
            text.replace("555-123-4567", "5551234567"),
        )
        .unwrap();

        match read_snapshot::<Patient>(&cfg.patient_data_path()) {
            Err(CaresError::YamlDeserialization(msg)) => {
                assert!(msg.contains("person.phone"), "{msg}");
            }
            other => panic!("expected a deserialization error, got {other:?}"),
        }
    }

    #[test]
    fn save_fails_when_data_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "").unwrap();
        let cfg = CaresConfig::new(PathBuf::from(&blocker)).unwrap();

        assert!(matches!(
            Database::with_default_staff().save(&cfg),
            Err(CaresError::StorageDirCreation(_))
        ));
    }
}
