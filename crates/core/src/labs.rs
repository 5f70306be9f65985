//! Lab orders and results.
//!
//! Every patient carries a [`LabPanel`]: the same ten tests, always in the same
//! order. Running a test bills it once more and draws a new outcome; resetting
//! only clears the outcome shown at the desk.

use crate::constants::{ABNORMAL_ODDS, LAB_COUNT};
use crate::{CaresError, CaresResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The ten lab tests, in panel order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabKind {
    RedBloodCell,
    WhiteBloodCell,
    LiverFunction,
    RenalFunction,
    Electrolytes,
    XRay,
    CtScan,
    Mri,
    Urine,
    Stool,
}

impl LabKind {
    pub const ALL: [LabKind; LAB_COUNT] = [
        LabKind::RedBloodCell,
        LabKind::WhiteBloodCell,
        LabKind::LiverFunction,
        LabKind::RenalFunction,
        LabKind::Electrolytes,
        LabKind::XRay,
        LabKind::CtScan,
        LabKind::Mri,
        LabKind::Urine,
        LabKind::Stool,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Like [`LabKind::from_index`], as a `CaresError` for caller-supplied indices.
    pub fn try_from_index(index: usize) -> CaresResult<Self> {
        Self::from_index(index).ok_or(CaresError::InvalidLabIndex(index))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            LabKind::RedBloodCell => "Red Blood Cell",
            LabKind::WhiteBloodCell => "White Blood Cell",
            LabKind::LiverFunction => "Liver Function",
            LabKind::RenalFunction => "Renal Function",
            LabKind::Electrolytes => "Electrolyte Levels",
            LabKind::XRay => "X-Ray",
            LabKind::CtScan => "C.T. Scan",
            LabKind::Mri => "MRI",
            LabKind::Urine => "Urine Test",
            LabKind::Stool => "Stool Test",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            LabKind::RedBloodCell => "rbc",
            LabKind::WhiteBloodCell => "wbc",
            LabKind::LiverFunction => "liver",
            LabKind::RenalFunction => "renal",
            LabKind::Electrolytes => "electrolyte",
            LabKind::XRay => "xray",
            LabKind::CtScan => "ct",
            LabKind::Mri => "mri",
            LabKind::Urine => "urine",
            LabKind::Stool => "stool",
        }
    }

    /// Cost of one run.
    pub fn base_cost(self) -> f64 {
        match self {
            LabKind::RedBloodCell => 11.0,
            LabKind::WhiteBloodCell => 14.0,
            LabKind::LiverFunction => 50.0,
            LabKind::RenalFunction => 50.0,
            LabKind::Electrolytes => 50.0,
            LabKind::XRay => 50.0,
            LabKind::CtScan => 450.0,
            LabKind::Mri => 1100.0,
            LabKind::Urine => 10.0,
            LabKind::Stool => 11.0,
        }
    }
}

impl std::fmt::Display for LabKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts a panel index (`0`-`9`) or a slug such as `mri`.
impl std::str::FromStr for LabKind {
    type Err = CaresError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Self::try_from_index(index);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| CaresError::InvalidInput(format!("unknown lab: {s}")))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabResult {
    #[default]
    NotRun,
    Normal,
    Abnormal,
}

impl LabResult {
    pub fn name(self) -> &'static str {
        match self {
            LabResult::NotRun => "NotRun",
            LabResult::Normal => "Normal",
            LabResult::Abnormal => "Abnormal",
        }
    }
}

impl std::fmt::Display for LabResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lab {
    kind: LabKind,
    #[serde(default)]
    result: LabResult,
    #[serde(default)]
    times_run: u32,
}

impl Lab {
    pub fn new(kind: LabKind) -> Self {
        Self {
            kind,
            result: LabResult::NotRun,
            times_run: 0,
        }
    }

    pub fn kind(&self) -> LabKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn base_cost(&self) -> f64 {
        self.kind.base_cost()
    }

    pub fn times_run(&self) -> u32 {
        self.times_run
    }

    pub fn result(&self) -> LabResult {
        self.result
    }

    /// Base cost times the number of runs.
    pub fn total_cost(&self) -> f64 {
        self.base_cost() * f64::from(self.times_run)
    }

    /// Runs the test once: one chance in six of an abnormal outcome.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> LabResult {
        self.times_run += 1;
        self.result = if rng.gen_range(0..ABNORMAL_ODDS) == 0 {
            LabResult::Abnormal
        } else {
            LabResult::Normal
        };
        self.result
    }

    /// Clears the outcome. The run count, and so the cost, is kept.
    pub fn reset(&mut self) {
        self.result = LabResult::NotRun;
    }
}

/// The fixed ten-slot lab panel attached to each patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Lab>", into = "Vec<Lab>")]
pub struct LabPanel {
    labs: [Lab; LAB_COUNT],
}

impl Default for LabPanel {
    fn default() -> Self {
        Self {
            labs: LabKind::ALL.map(Lab::new),
        }
    }
}

impl LabPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labs(&self) -> &[Lab; LAB_COUNT] {
        &self.labs
    }

    pub fn lab(&self, kind: LabKind) -> &Lab {
        &self.labs[kind.index()]
    }

    pub fn run_lab<R: Rng + ?Sized>(&mut self, kind: LabKind, rng: &mut R) -> LabResult {
        let result = self.labs[kind.index()].run(rng);
        tracing::debug!(lab = kind.name(), %result, "lab run");
        result
    }

    pub fn reset_lab(&mut self, kind: LabKind) -> LabResult {
        let lab = &mut self.labs[kind.index()];
        lab.reset();
        lab.result()
    }

    /// Result names of every lab, in panel order.
    pub fn current_results(&self) -> [&'static str; LAB_COUNT] {
        std::array::from_fn(|i| self.labs[i].result().name())
    }

    /// Sum of every lab's total cost.
    pub fn total_cost(&self) -> f64 {
        self.labs.iter().map(Lab::total_cost).sum()
    }
}

impl TryFrom<Vec<Lab>> for LabPanel {
    type Error = String;

    fn try_from(labs: Vec<Lab>) -> Result<Self, Self::Error> {
        let found = labs.len();
        let labs: [Lab; LAB_COUNT] = labs
            .try_into()
            .map_err(|_| format!("lab panel must have {LAB_COUNT} labs, found {found}"))?;

        for (lab, expected) in labs.iter().zip(LabKind::ALL) {
            if lab.kind() != expected {
                return Err(format!(
                    "lab panel out of order: expected {expected:?} at slot {}, found {:?}",
                    expected.index(),
                    lab.kind()
                ));
            }
        }

        Ok(Self { labs })
    }
}

impl From<LabPanel> for Vec<Lab> {
    fn from(panel: LabPanel) -> Self {
        panel.labs.into()
    }
}
