//! Fictional patient scenarios
//!
//! A scenario is the set of invented facts one prompt is built from. Field
//! names serialize as camelCase because existing results files and review
//! tooling expect those keys.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language the summaries are generated in. Recorded in the results file;
/// the vocabulary filenames themselves are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Norwegian bokmål
    #[default]
    Nb,
    /// English
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nb" => Ok(Locale::Nb),
            "en" => Ok(Locale::En),
            _ => Err(format!("Invalid locale: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub given_name: String,
    pub family_name: String,
    pub age: u32,
    pub phone_number: String,
    pub city: String,
    pub health_care_unit: String,
    pub diagnosis: String,
    pub birth_date: String,
    pub admission_date: String,
    pub social_security_number: String,
}

impl Scenario {
    /// Build a scenario from sampled vocabulary entries, filling the
    /// remaining fields from the RNG. `today` is the reference date for the
    /// age calculation and is injected so tests stay deterministic.
    pub fn generate(
        rng: &mut impl Rng,
        today: NaiveDate,
        given_name: String,
        family_name: String,
        diagnosis: String,
        health_care_unit: String,
    ) -> Self {
        let (earliest_birth, latest_birth) = birth_date_range();
        let birth_date = random_date_between(rng, earliest_birth, latest_birth);
        let (earliest_admission, latest_admission) = admission_date_range();
        let admission_date = random_date_between(rng, earliest_admission, latest_admission);

        Scenario {
            given_name,
            family_name,
            age: age_on(today, birth_date),
            phone_number: random_phone_number(rng),
            city: "Oslo".to_string(),
            health_care_unit,
            diagnosis,
            birth_date: written_date(birth_date),
            admission_date: written_date(admission_date),
            social_security_number: random_national_id(rng),
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Patients are born between these dates (inclusive).
fn birth_date_range() -> (NaiveDate, NaiveDate) {
    (ymd(1943, 1, 1), ymd(2010, 1, 1))
}

/// Admissions fall between these dates (inclusive).
fn admission_date_range() -> (NaiveDate, NaiveDate) {
    (ymd(2012, 1, 1), ymd(2023, 1, 1))
}

/// Uniformly random date in `[start, end]`.
pub fn random_date_between(rng: &mut impl Rng, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let days = (end - start).num_days();
    start + Duration::days(rng.gen_range(0..=days))
}

/// Age in whole years using 365-day years; drifts slightly across leap
/// days, which fictional patients tolerate.
pub fn age_on(today: NaiveDate, birth_date: NaiveDate) -> u32 {
    (today.signed_duration_since(birth_date).num_days() / 365).max(0) as u32
}

/// Dates are written out long-form in the prompt, e.g. `March 07. 1984`.
pub fn written_date(date: NaiveDate) -> String {
    date.format("%B %d. %Y").to_string()
}

/// Eight random digits, as a bare number or with a 0047/+47 country prefix.
pub fn random_phone_number(rng: &mut impl Rng) -> String {
    let digits = format!("{:08}", rng.gen_range(0..100_000_000u64));
    match rng.gen_range(0..3) {
        0 => digits,
        1 => format!("0047{}", digits),
        _ => format!("+47{}", digits),
    }
}

/// Eleven random digits, sometimes split in the written 6+5 form.
pub fn random_national_id(rng: &mut impl Rng) -> String {
    let digits = format!("{:011}", rng.gen_range(0..100_000_000_000u64));
    if rng.gen_bool(0.5) {
        digits
    } else {
        format!("{} {}", &digits[..6], &digits[6..])
    }
}
