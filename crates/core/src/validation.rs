//! Input validation utilities.
//!
//! Desk searches are typed as `Last, First` plus a date of birth. This module
//! checks that shape before anything touches the patient table.

use crate::person::record_key;
use crate::{CaresError, CaresResult};
use regex::Regex;
use std::sync::OnceLock;

fn search_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z'-]+), ([A-Za-z'-]+)$").expect("search name pattern is valid")
    })
}

fn search_dob_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").expect("search dob pattern is valid")
    })
}

/// A well-formed patient search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub last_name: String,
    pub first_name: String,
    pub dob: String,
}

impl SearchQuery {
    /// The patient table key this search looks up.
    pub fn key(&self) -> String {
        record_key(&self.last_name, &self.first_name, &self.dob)
    }
}

/// Validates a `Last, First` name query and a `MM/DD/YYYY` date of birth.
///
/// Surrounding whitespace is ignored; the single space after the comma is
/// required.
///
/// # Errors
///
/// Returns `CaresError::InvalidSearch` if either part is malformed.
pub fn parse_search_query(name: &str, dob: &str) -> CaresResult<SearchQuery> {
    let dob = dob.trim();
    let captures = search_name_re()
        .captures(name.trim())
        .ok_or(CaresError::InvalidSearch)?;

    if !search_dob_re().is_match(dob) {
        return Err(CaresError::InvalidSearch);
    }

    Ok(SearchQuery {
        last_name: captures[1].to_string(),
        first_name: captures[2].to_string(),
        dob: dob.to_string(),
    })
}
