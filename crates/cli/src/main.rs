use anyhow::Context;
use cares_core::{
    resolve_data_dir, CaresConfig, CaresResult, CheckInForm, ConditionKind, Database, DeskSession,
    LabKind, Patient, PatientField, WarningListener, WarningManager,
};
use clap::{Args, Parser, Subcommand};
use rand::Rng;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cares")]
#[command(about = "C.A.R.E.S. hospital front desk CLI")]
struct Cli {
    /// Directory holding login_data.yaml and patient_data.yaml
    #[arg(long, env = "CARES_DATA_DIR", global = true)]
    data_dir: Option<String>,
    /// Staff username
    #[arg(long, env = "CARES_USERNAME", global = true)]
    username: Option<String>,
    /// Staff password
    #[arg(long, env = "CARES_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Selects a patient the way the desk search does.
#[derive(Args, Debug)]
struct PatientArgs {
    /// Patient name as "Last, First"
    #[arg(long)]
    patient: String,
    /// Date of birth (MM/DD/YYYY)
    #[arg(long)]
    dob: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the logged-in staff member
    Whoami,
    /// List the patients this role may see
    List,
    /// Check in a new patient
    CheckIn {
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        first_name: String,
        /// Date of birth (MM/DD/YYYY)
        #[arg(long)]
        dob: String,
        #[arg(long)]
        address: String,
        /// Phone number (000-000-0000)
        #[arg(long)]
        phone: String,
        #[arg(long)]
        insurance: String,
        /// Emergency contact phone number (000-000-0000)
        #[arg(long)]
        emergency_contact: String,
    },
    /// Show a patient's record
    Show(PatientArgs),
    /// Admit a checked-in patient
    Admit(PatientArgs),
    /// Start a patient's discharge
    StartDischarge(PatientArgs),
    /// Complete a patient's discharge
    Discharge(PatientArgs),
    /// Set one field of a patient's record; an empty value clears optional fields
    Set {
        #[command(flatten)]
        target: PatientArgs,
        /// Field name, e.g. last-name, blood-pressure, discharge-instructions
        field: PatientField,
        value: String,
    },
    /// Run one or more labs
    RunLabs {
        #[command(flatten)]
        target: PatientArgs,
        /// Lab index (0-9) or name, e.g. rbc, xray, mri
        #[arg(required = true)]
        labs: Vec<LabKind>,
    },
    /// Clear a lab's result
    ResetLab {
        #[command(flatten)]
        target: PatientArgs,
        lab: LabKind,
    },
    /// Show a patient's lab results
    Labs(PatientArgs),
    /// Diagnose a condition, or clear it with --clear
    Diagnose {
        #[command(flatten)]
        target: PatientArgs,
        /// Condition index (0-4) or name, e.g. hypertension, kidney
        condition: ConditionKind,
        #[arg(long)]
        clear: bool,
    },
    /// Prescribe one of a diagnosed condition's medications, or withdraw it with --clear
    Prescribe {
        #[command(flatten)]
        target: PatientArgs,
        condition: ConditionKind,
        /// Medication slot (0-2)
        slot: usize,
        #[arg(long)]
        clear: bool,
    },
    /// Print a patient's bill
    Bill(PatientArgs),
}

/// Prints desk warnings and notices to stderr.
struct StderrListener;

impl WarningListener for StderrListener {
    fn show_warning(&self, message: &str) {
        eprintln!("{message}");
    }
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("cares=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'cares --help' for commands");
        return Ok(ExitCode::SUCCESS);
    };

    let cfg = CaresConfig::new(resolve_data_dir(cli.data_dir))?;
    let username = cli
        .username
        .context("a username is required (--username or CARES_USERNAME)")?;
    let password = cli
        .password
        .context("a password is required (--password or CARES_PASSWORD)")?;

    let mut warnings = WarningManager::new();
    warnings.add_listener(Box::new(StderrListener));

    let mut db = Database::load(&cfg);
    let today = chrono::Local::now().date_naive();

    // Failures have already been shown through the warning listener.
    let outcome = DeskSession::login(&mut db, &warnings, &username, &password, today)
        .and_then(|mut desk| {
            tracing::debug!(?command, "running command");
            run(&mut desk, command, &mut rand::thread_rng())
        });

    match outcome {
        Ok(true) => {
            if let Err(err) = db.save(&cfg) {
                tracing::error!(error = %err, "failed to save records");
                return Err(anyhow::Error::new(err)
                    .context(format!("saving to {}", cfg.data_dir().display())));
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(false) => Ok(ExitCode::SUCCESS),
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

/// Runs one command. Returns whether the database changed.
fn run<R: Rng>(desk: &mut DeskSession<'_>, command: Commands, rng: &mut R) -> CaresResult<bool> {
    match command {
        Commands::Whoami => {
            let staff = desk.staff();
            println!(
                "{} ({}), {}",
                staff.username(),
                staff.role(),
                staff.person().display_name()
            );
            Ok(false)
        }
        Commands::List => {
            let patients = desk.visible_patients()?;
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in patients {
                println!(
                    "{}  {}  {}",
                    patient.person().display_name(),
                    patient.person().dob(),
                    patient.status()
                );
            }
            Ok(false)
        }
        Commands::CheckIn {
            last_name,
            first_name,
            dob,
            address,
            phone,
            insurance,
            emergency_contact,
        } => {
            let patient = desk.check_in(CheckInForm {
                last_name,
                first_name,
                dob,
                address,
                phone,
                insurance_plan: insurance,
                emergency_contact,
            })?;
            println!("Patient ID: {}", patient.patient_id());
            Ok(true)
        }
        Commands::Show(target) => {
            let patient = select(desk, &target)?;
            print_patient(patient);
            Ok(false)
        }
        Commands::Admit(target) => {
            select(desk, &target)?;
            desk.admit()?;
            Ok(true)
        }
        Commands::StartDischarge(target) => {
            select(desk, &target)?;
            desk.start_discharge()?;
            Ok(true)
        }
        Commands::Discharge(target) => {
            select(desk, &target)?;
            desk.complete_discharge()?;
            Ok(true)
        }
        Commands::Set {
            target,
            field,
            value,
        } => {
            select(desk, &target)?;
            desk.update_field(field, &value)?;
            if let Some(patient) = desk.current_patient() {
                println!("{field} updated for {}", patient.patient_id());
            }
            Ok(true)
        }
        Commands::RunLabs { target, labs } => {
            select(desk, &target)?;
            let results = desk.run_labs(&labs, rng)?;
            for (lab, result) in labs.iter().zip(results) {
                println!("{lab}: {result}");
            }
            Ok(true)
        }
        Commands::ResetLab { target, lab } => {
            select(desk, &target)?;
            let result = desk.reset_lab(lab)?;
            println!("{lab}: {result}");
            Ok(true)
        }
        Commands::Labs(target) => {
            select(desk, &target)?;
            let results = desk.lab_results()?;
            for (index, (lab, result)) in LabKind::ALL.iter().zip(results).enumerate() {
                println!("{index}  {:<20}{result}", lab.name());
            }
            Ok(false)
        }
        Commands::Diagnose {
            target,
            condition,
            clear,
        } => {
            select(desk, &target)?;
            desk.set_diagnosed(condition, !clear)?;
            Ok(true)
        }
        Commands::Prescribe {
            target,
            condition,
            slot,
            clear,
        } => {
            select(desk, &target)?;
            desk.set_prescribed(condition, slot, !clear)?;
            Ok(true)
        }
        Commands::Bill(target) => {
            select(desk, &target)?;
            print!("{}", desk.bill()?);
            Ok(false)
        }
    }
}

fn select<'s>(desk: &'s mut DeskSession<'_>, target: &PatientArgs) -> CaresResult<&'s Patient> {
    desk.search_patient(&target.patient, &target.dob)
}

fn print_patient(patient: &Patient) {
    let person = patient.person();
    let vitals = patient.vitals();

    println!("Patient: {}", person.display_name());
    println!("ID: {}", patient.patient_id());
    println!("Date of birth: {}", person.dob());
    println!("Address: {}", person.address());
    println!("Phone: {}", person.phone());
    println!("Insurance: {}", patient.insurance_plan());
    println!("Emergency contact: {}", patient.emergency_contact());
    println!("Status: {}", patient.status());
    println!("Admitted: {}", patient.admitted_date().format("%m/%d/%Y"));
    if let Some(date) = patient.discharge_date() {
        println!("Discharged: {}", date.format("%m/%d/%Y"));
    }

    println!("Height: {}", measurement(vitals.height()));
    println!("Weight: {}", measurement(vitals.weight()));
    println!(
        "Blood pressure: {}",
        vitals
            .blood_pressure()
            .map(|bp| bp.to_string())
            .unwrap_or_default()
    );
    println!("Heart rate: {}", measurement(vitals.heart_rate()));
    println!("Oxygen level: {}", measurement(vitals.oxygen_level()));
    println!("Body temperature: {}", measurement(vitals.body_temp()));
    println!("BMI: {}", measurement(vitals.body_mass_index()));

    for condition in patient.diagnosis().conditions() {
        if !condition.is_diagnosed() {
            continue;
        }
        println!("Diagnosed: {}", condition.kind());
        for (slot, prescription) in condition.valid_prescriptions().iter().enumerate() {
            let mark = if prescription.is_prescribed() { "x" } else { " " };
            let medication = prescription.medication();
            println!(
                "  [{mark}] {slot} {medication} ({})",
                medication.administration()
            );
        }
    }

    if !patient.discharge_instruction().is_empty() {
        println!("Discharge instructions: {}", patient.discharge_instruction());
    }
}

fn measurement(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
