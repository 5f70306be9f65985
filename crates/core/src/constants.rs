//! Constants used throughout the C.A.R.E.S. core crate.
//!
//! File names, fixed rates and field ranges live here so the data files and
//! the bill stay consistent across the codebase.

/// Default directory for the data files when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "cares_data";

/// Filename for the staff login table snapshot.
pub const LOGIN_DATA_FILENAME: &str = "login_data.yaml";

/// Filename for the patient table snapshot.
pub const PATIENT_DATA_FILENAME: &str = "patient_data.yaml";

/// Snapshot schema version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Charge per day of stay; also billed once as the base charge.
pub const DAY_RATE: f64 = 10_900.0;

/// Column width of a formatted bill line.
pub const BILL_LINE_WIDTH: usize = 40;

/// Number of slots in a lab panel.
pub const LAB_COUNT: usize = 10;

/// Number of diagnosable conditions.
pub const CONDITION_COUNT: usize = 5;

/// Number of prescriptions gated by each condition.
pub const PRESCRIPTIONS_PER_CONDITION: usize = 3;

/// One abnormal lab outcome in this many runs, on average.
pub const ABNORMAL_ODDS: u32 = 6;
