//! Diagnoses and the prescriptions they unlock.
//!
//! A [`Diagnosis`] holds the five conditions the desk can diagnose. Each
//! condition gates three fixed prescriptions: they can only be prescribed while
//! the condition is diagnosed, and clearing the diagnosis withdraws all three.

use crate::constants::{CONDITION_COUNT, PRESCRIPTIONS_PER_CONDITION};
use crate::{CaresError, CaresResult};
use serde::{Deserialize, Serialize};

/// How a medication is given.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Administration {
    Intravascular,
    Intramuscular,
    Subcutaneous,
    Exercise,
    Oral,
}

impl std::fmt::Display for Administration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Administration::Intravascular => "intravascular",
            Administration::Intramuscular => "intramuscular",
            Administration::Subcutaneous => "subcutaneous",
            Administration::Exercise => "exercise",
            Administration::Oral => "oral",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Medication {
    Hydralazine,
    Labetalol,
    Fenoldopam,
    Atorvastatin,
    Ezetimibe,
    Alirocumab,
    Rocaltrol,
    Xphozah,
    Renvela,
    Epclusa,
    Mavyret,
    Zepatier,
    Ibuprofen,
    Oxycodone,
    PhysicalTherapy,
}

impl Medication {
    pub fn administration(self) -> Administration {
        match self {
            Medication::Hydralazine | Medication::Fenoldopam => Administration::Intramuscular,
            Medication::Alirocumab => Administration::Subcutaneous,
            Medication::PhysicalTherapy => Administration::Exercise,
            Medication::Labetalol
            | Medication::Atorvastatin
            | Medication::Ezetimibe
            | Medication::Rocaltrol
            | Medication::Xphozah
            | Medication::Renvela
            | Medication::Epclusa
            | Medication::Mavyret
            | Medication::Zepatier
            | Medication::Ibuprofen
            | Medication::Oxycodone => Administration::Oral,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Medication::Hydralazine => "Hydralazine",
            Medication::Labetalol => "Labetalol",
            Medication::Fenoldopam => "Fenoldopam",
            Medication::Atorvastatin => "Atorvastatin",
            Medication::Ezetimibe => "Ezetimibe",
            Medication::Alirocumab => "Alirocumab",
            Medication::Rocaltrol => "Rocaltrol",
            Medication::Xphozah => "Xphozah",
            Medication::Renvela => "Renvela",
            Medication::Epclusa => "Epclusa",
            Medication::Mavyret => "Mavyret",
            Medication::Zepatier => "Zepatier",
            Medication::Ibuprofen => "Ibuprofen",
            Medication::Oxycodone => "Oxycodone",
            Medication::PhysicalTherapy => "Physical Therapy",
        }
    }
}

impl std::fmt::Display for Medication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    medication: Medication,
    #[serde(default)]
    is_prescribed: bool,
}

impl Prescription {
    pub fn new(medication: Medication) -> Self {
        Self {
            medication,
            is_prescribed: false,
        }
    }

    pub fn medication(&self) -> Medication {
        self.medication
    }

    pub fn is_prescribed(&self) -> bool {
        self.is_prescribed
    }
}

/// The five diagnosable conditions, in desk order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    Hypertension,
    Hyperlipidemia,
    KidneyDisease,
    LiverDisease,
    BrokenHumerus,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; CONDITION_COUNT] = [
        ConditionKind::Hypertension,
        ConditionKind::Hyperlipidemia,
        ConditionKind::KidneyDisease,
        ConditionKind::LiverDisease,
        ConditionKind::BrokenHumerus,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn try_from_index(index: usize) -> CaresResult<Self> {
        Self::from_index(index).ok_or(CaresError::InvalidConditionIndex(index))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ConditionKind::Hypertension => "High Blood Pressure",
            ConditionKind::Hyperlipidemia => "High Cholesterol",
            ConditionKind::KidneyDisease => "Kidney Disease",
            ConditionKind::LiverDisease => "Liver Disease",
            ConditionKind::BrokenHumerus => "Broken Humerus",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ConditionKind::Hypertension => "hypertension",
            ConditionKind::Hyperlipidemia => "hyperlipidemia",
            ConditionKind::KidneyDisease => "kidney",
            ConditionKind::LiverDisease => "liver",
            ConditionKind::BrokenHumerus => "humerus",
        }
    }

    /// The three medications this condition allows, in slot order.
    pub fn medications(self) -> [Medication; PRESCRIPTIONS_PER_CONDITION] {
        match self {
            ConditionKind::Hypertension => [
                Medication::Hydralazine,
                Medication::Labetalol,
                Medication::Fenoldopam,
            ],
            ConditionKind::Hyperlipidemia => [
                Medication::Atorvastatin,
                Medication::Ezetimibe,
                Medication::Alirocumab,
            ],
            ConditionKind::KidneyDisease => [
                Medication::Rocaltrol,
                Medication::Xphozah,
                Medication::Renvela,
            ],
            ConditionKind::LiverDisease => [
                Medication::Epclusa,
                Medication::Mavyret,
                Medication::Zepatier,
            ],
            ConditionKind::BrokenHumerus => [
                Medication::Ibuprofen,
                Medication::Oxycodone,
                Medication::PhysicalTherapy,
            ],
        }
    }
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts a condition index (`0`-`4`) or a slug such as `kidney`.
impl std::str::FromStr for ConditionKind {
    type Err = CaresError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Self::try_from_index(index);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| CaresError::InvalidInput(format!("unknown condition: {s}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    kind: ConditionKind,
    #[serde(default)]
    is_diagnosed: bool,
    prescriptions: [Prescription; PRESCRIPTIONS_PER_CONDITION],
}

impl Condition {
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            is_diagnosed: false,
            prescriptions: kind.medications().map(Prescription::new),
        }
    }

    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    pub fn is_diagnosed(&self) -> bool {
        self.is_diagnosed
    }

    pub fn valid_prescriptions(&self) -> &[Prescription; PRESCRIPTIONS_PER_CONDITION] {
        &self.prescriptions
    }

    fn check_shape(&self, expected: ConditionKind) -> Result<(), String> {
        if self.kind != expected {
            return Err(format!(
                "diagnosis out of order: expected {expected:?} at slot {}, found {:?}",
                expected.index(),
                self.kind
            ));
        }
        let medications = self.prescriptions.map(|p| p.medication());
        if medications != expected.medications() {
            return Err(format!(
                "{expected:?} lists unexpected medications {medications:?}"
            ));
        }
        if !self.is_diagnosed && self.prescriptions.iter().any(|p| p.is_prescribed) {
            return Err(format!("{expected:?} has prescriptions but is not diagnosed"));
        }
        Ok(())
    }
}

/// The patient's diagnoses and prescriptions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Condition>", into = "Vec<Condition>")]
pub struct Diagnosis {
    conditions: [Condition; CONDITION_COUNT],
}

impl Default for Diagnosis {
    fn default() -> Self {
        Self {
            conditions: ConditionKind::ALL.map(Condition::new),
        }
    }
}

impl Diagnosis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conditions(&self) -> &[Condition; CONDITION_COUNT] {
        &self.conditions
    }

    pub fn condition(&self, kind: ConditionKind) -> &Condition {
        &self.conditions[kind.index()]
    }

    /// Diagnosis flag of every condition, in desk order.
    pub fn is_diagnosed(&self) -> [bool; CONDITION_COUNT] {
        std::array::from_fn(|i| self.conditions[i].is_diagnosed)
    }

    /// Sets or clears a diagnosis. Clearing withdraws the condition's
    /// prescriptions.
    pub fn set_is_diagnosed(&mut self, kind: ConditionKind, diagnosed: bool) {
        let condition = &mut self.conditions[kind.index()];
        condition.is_diagnosed = diagnosed;
        if !diagnosed {
            for prescription in &mut condition.prescriptions {
                prescription.is_prescribed = false;
            }
        }
    }

    /// Prescribes or withdraws the medication in `slot` of a condition.
    ///
    /// # Errors
    ///
    /// - `InvalidPrescriptionSlot` if `slot` is not 0, 1 or 2.
    /// - `ConditionNotDiagnosed` when prescribing for an undiagnosed condition.
    pub fn set_prescribed(
        &mut self,
        kind: ConditionKind,
        slot: usize,
        prescribed: bool,
    ) -> CaresResult<()> {
        let condition = &mut self.conditions[kind.index()];
        if prescribed && !condition.is_diagnosed {
            return Err(CaresError::ConditionNotDiagnosed(kind));
        }
        let prescription = condition
            .prescriptions
            .get_mut(slot)
            .ok_or(CaresError::InvalidPrescriptionSlot(slot))?;
        prescription.is_prescribed = prescribed;
        Ok(())
    }

    /// Every prescribed medication with the condition it treats.
    pub fn active_prescriptions(&self) -> Vec<(ConditionKind, Medication)> {
        self.conditions
            .iter()
            .flat_map(|c| {
                c.prescriptions
                    .iter()
                    .filter(|p| p.is_prescribed)
                    .map(move |p| (c.kind, p.medication))
            })
            .collect()
    }
}

impl TryFrom<Vec<Condition>> for Diagnosis {
    type Error = String;

    fn try_from(conditions: Vec<Condition>) -> Result<Self, Self::Error> {
        let found = conditions.len();
        let conditions: [Condition; CONDITION_COUNT] = conditions.try_into().map_err(|_| {
            format!("diagnosis must have {CONDITION_COUNT} conditions, found {found}")
        })?;

        for (condition, expected) in conditions.iter().zip(ConditionKind::ALL) {
            condition.check_shape(expected)?;
        }

        Ok(Self { conditions })
    }
}

impl From<Diagnosis> for Vec<Condition> {
    fn from(diagnosis: Diagnosis) -> Self {
        diagnosis.conditions.into()
    }
}
