//! Resume completeness scoring.
//!
//! A pure, total function of the submitted payload: every field that is present earns a
//! fixed number of points and the points add up to at most [`MAX_SCORE`]. Only the first
//! education entry and the first experience entry are looked at; further entries are
//! stored but never scored.

use crate::models::ResumeData;

pub const NAME_POINTS: i32 = 6;
pub const EMAIL_POINTS: i32 = 7;
pub const PHONE_POINTS: i32 = 6;
pub const ADDRESS_POINTS: i32 = 6;
pub const PROFESSION_POINTS: i32 = 5;

pub const DEGREE_POINTS: i32 = 8;
pub const INSTITUTION_POINTS: i32 = 8;
pub const YEAR_POINTS: i32 = 9;

pub const COMPANY_POINTS: i32 = 7;
pub const ROLE_POINTS: i32 = 8;
pub const DURATION_POINTS: i32 = 7;
pub const DESCRIPTION_POINTS: i32 = 8;

pub const SKILLS_POINTS: i32 = 15;

/// Score of a fully filled-in resume.
pub const MAX_SCORE: i32 = NAME_POINTS
    + EMAIL_POINTS
    + PHONE_POINTS
    + ADDRESS_POINTS
    + PROFESSION_POINTS
    + DEGREE_POINTS
    + INSTITUTION_POINTS
    + YEAR_POINTS
    + COMPANY_POINTS
    + ROLE_POINTS
    + DURATION_POINTS
    + DESCRIPTION_POINTS
    + SKILLS_POINTS;

/// Computes the completeness score of a resume payload.
pub fn score(data: &ResumeData) -> i32 {
    let mut total = 0;

    total += points(&data.name, NAME_POINTS);
    total += points(&data.email, EMAIL_POINTS);
    total += points(&data.phone, PHONE_POINTS);
    total += points(&data.address, ADDRESS_POINTS);
    total += points(&data.profession, PROFESSION_POINTS);

    if let Some(first) = data.education.as_deref().and_then(<[_]>::first) {
        total += points(&first.degree, DEGREE_POINTS);
        total += points(&first.institution, INSTITUTION_POINTS);
        total += points(&first.year, YEAR_POINTS);
    }

    if let Some(first) = data.experience.as_deref().and_then(<[_]>::first) {
        total += points(&first.company, COMPANY_POINTS);
        total += points(&first.role, ROLE_POINTS);
        total += points(&first.duration, DURATION_POINTS);
        total += points(&first.description, DESCRIPTION_POINTS);
    }

    if data.skills.as_ref().is_some_and(|skills| !skills.is_empty()) {
        total += SKILLS_POINTS;
    }

    total
}

fn points(field: &Option<String>, value: i32) -> i32 {
    match field.as_deref() {
        Some(text) if !text.is_empty() => value,
        _ => 0,
    }
}
