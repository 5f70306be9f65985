//! Plain-text bill for a patient's stay.

use crate::constants::{BILL_LINE_WIDTH, DAY_RATE};
use crate::patient::Patient;
use chrono::NaiveDate;
use std::fmt::Write;

const RULE: &str = "########################################";

/// Renders the bill shown to billing staff.
///
/// The stay runs to the discharge date, or to `today` if the patient has not
/// been discharged yet. The base charge is one day's rate on top of the stay.
pub fn render_bill(patient: &Patient, today: NaiveDate) -> String {
    let days = patient.stay_days(today);
    let stay_cost = days as f64 * DAY_RATE;
    let labs_cost = patient.lab_panel().total_cost();
    let total = labs_cost + stay_cost + DAY_RATE;

    let mut bill = String::new();
    let _ = writeln!(bill, "Patient: {}", patient.person().display_name());
    bill.push_str("#################COSTS:#################\n");
    bill.push_str("\n-----------------Stay:------------------\n");
    push_line(&mut bill, "-Base ", &amount(DAY_RATE));
    push_line(&mut bill, &format!("-Days: {days}"), &amount(stay_cost));
    bill.push_str("\n-----------------LABS:------------------\n");
    for lab in patient.lab_panel().labs() {
        let label = format!("{}({}x)", lab.name(), lab.times_run());
        push_line(&mut bill, &label, &amount(lab.total_cost()));
    }
    let _ = write!(bill, "\n{RULE}\n\n");
    push_line(&mut bill, "Insurance:", patient.insurance_plan());
    let _ = write!(bill, "\n{RULE}\n\n\n");
    push_line(&mut bill, "Total:", &amount(total));
    bill
}

fn amount(value: f64) -> String {
    format!("{value:.2}$")
}

/// Appends `label`, then `value` right-aligned to the bill width. Lines that
/// do not fit are written with no padding.
fn push_line(bill: &mut String, label: &str, value: &str) {
    let width = BILL_LINE_WIDTH.saturating_sub(label.chars().count());
    let _ = writeln!(bill, "{label}{value:>width$}");
}
