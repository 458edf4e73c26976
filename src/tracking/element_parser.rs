//! Decoding of two-line element sets.
//!
//! Both lines are fixed-width, 69 columns each, with a modulo-10 checksum in the last
//! column. Column ranges below are zero-based and end-exclusive.

use chrono::{NaiveDate, TimeDelta};
use std::ops::Range;
use strum_macros::Display;

/// Width of a single element line, checksum column included.
pub const LINE_LENGTH: usize = 69;

const CATALOG_NUMBER: Range<usize> = 2..7;
const CLASSIFICATION: usize = 7;
const EPOCH_YEAR: Range<usize> = 18..20;
const EPOCH_DAY: Range<usize> = 20..32;
const EPHEMERIS_TYPE: usize = 62;

const INCLINATION: Range<usize> = 8..16;
const RIGHT_ASCENSION: Range<usize> = 17..25;
const ECCENTRICITY: Range<usize> = 26..33;
const ARGUMENT_OF_PERIGEE: Range<usize> = 34..42;
const MEAN_ANOMALY: Range<usize> = 43..51;
const MEAN_MOTION: Range<usize> = 52..63;

const CHECKSUM: usize = 68;
const NANOS_PER_DAY: u128 = 86_400_000_000_000;

/// The numeric fields of an element set, named for error reporting.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ElementField {
    CatalogNumber,
    Classification,
    EpochYear,
    EpochDay,
    EphemerisType,
    Inclination,
    RightAscension,
    Eccentricity,
    ArgumentOfPerigee,
    MeanAnomaly,
    MeanMotion,
}

#[derive(Debug, Display, Clone, PartialEq)]
pub enum ParseError {
    /// A line is not exactly [`LINE_LENGTH`] columns wide.
    LineLength { line: u8, length: usize },
    /// A line contains non-ASCII characters, so columns cannot be addressed.
    Encoding { line: u8 },
    /// The leading line number is not the expected `1` or `2`.
    LineNumber { line: u8 },
    Checksum { line: u8, expected: u8, found: u8 },
    /// Both lines must describe the same object.
    CatalogMismatch { line1: u32, line2: u32 },
    InvalidField(ElementField),
    OutOfRange(ElementField),
    /// The propagation model refused the decoded elements.
    Rejected(String),
}

impl std::error::Error for ParseError {}

/// A validated element set, ready for propagation.
///
/// Layout, checksum, catalog number and epoch are decoded here so a bad line fails with a
/// precise [`ParseError`]. The orbital elements themselves are read from the propagation
/// model's own decoding, the numeric fields are only range-checked on the way in.
#[derive(Debug, Clone)]
pub struct ElementSet {
    /// Catalog number with the alpha-5 prefix resolved.
    catalog_number: u32,
    classification: char,
    /// Exact epoch, evaluated in integer nanoseconds.
    epoch: chrono::DateTime<chrono::Utc>,
    model: sgp4::Elements,
}

impl ElementSet {
    pub fn catalog_number(&self) -> u32 { self.catalog_number }
    pub fn classification(&self) -> char { self.classification }
    pub fn epoch(&self) -> chrono::DateTime<chrono::Utc> { self.epoch }
    /// Launch designator with a four digit year, e.g. `1993-036BX`. `None` if blank.
    pub fn international_designator(&self) -> Option<&str> {
        self.model.international_designator.as_deref()
    }
    /// First derivative of mean motion divided by two, rev/day².
    pub fn mean_motion_dot(&self) -> f64 { self.model.mean_motion_dot }
    /// Drag term, 1/earth radii.
    pub fn bstar(&self) -> f64 { self.model.drag_term }
    pub fn inclination_deg(&self) -> f64 { self.model.inclination }
    pub fn right_ascension_deg(&self) -> f64 { self.model.right_ascension }
    pub fn eccentricity(&self) -> f64 { self.model.eccentricity }
    /// Mean motion, rev/day.
    pub fn mean_motion(&self) -> f64 { self.model.mean_motion }
    pub(super) fn model(&self) -> &sgp4::Elements { &self.model }
}

/// Modulo-10 checksum over the first 68 columns: digits count at face value,
/// minus signs count as one, everything else is ignored.
pub fn checksum(line: &str) -> u8 {
    let sum: u32 = line
        .bytes()
        .take(CHECKSUM)
        .map(|b| match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'-' => 1,
            _ => 0,
        })
        .sum();
    // sum % 10 always fits
    #[allow(clippy::cast_possible_truncation)]
    let digit = (sum % 10) as u8;
    digit
}

/// Validates and decodes one element set.
///
/// # Errors
/// Returns a [`ParseError`] naming the first layout, checksum or field problem found.
pub fn parse_elements(line1: &str, line2: &str) -> Result<ElementSet, ParseError> {
    let line1 = validate_line(line1, 1)?;
    let line2 = validate_line(line2, 2)?;

    let catalog_number = parse_catalog_number(&line1[CATALOG_NUMBER])?;
    let line2_catalog_number = parse_catalog_number(&line2[CATALOG_NUMBER])?;
    if catalog_number != line2_catalog_number {
        return Err(ParseError::CatalogMismatch {
            line1: catalog_number,
            line2: line2_catalog_number,
        });
    }

    let classification = match line1.as_bytes()[CLASSIFICATION] {
        b'U' | b' ' => 'U',
        b'C' => 'C',
        b'S' => 'S',
        _ => return Err(ParseError::InvalidField(ElementField::Classification)),
    };
    if !matches!(line1.as_bytes()[EPHEMERIS_TYPE], b'0'..=b'9' | b' ') {
        return Err(ParseError::InvalidField(ElementField::EphemerisType));
    }

    parse_angle(&line2[INCLINATION], ElementField::Inclination, 180.0)?;
    parse_angle(&line2[RIGHT_ASCENSION], ElementField::RightAscension, 360.0)?;
    parse_angle(&line2[ARGUMENT_OF_PERIGEE], ElementField::ArgumentOfPerigee, 360.0)?;
    parse_angle(&line2[MEAN_ANOMALY], ElementField::MeanAnomaly, 360.0)?;
    parse_implied_fraction(&line2[ECCENTRICITY], ElementField::Eccentricity)?;
    if parse_float(&line2[MEAN_MOTION], ElementField::MeanMotion)? <= 0.0 {
        return Err(ParseError::OutOfRange(ElementField::MeanMotion));
    }
    let epoch = parse_epoch(&line1[EPOCH_YEAR], &line1[EPOCH_DAY])?;

    let model = sgp4::Elements::from_tle(None, line1.as_bytes(), line2.as_bytes())
        .map_err(|e| ParseError::Rejected(format!("{e:?}")))?;
    Ok(ElementSet { catalog_number, classification, epoch, model })
}

fn validate_line(raw: &str, line: u8) -> Result<&str, ParseError> {
    let trimmed = raw.trim_end();
    if !trimmed.is_ascii() {
        return Err(ParseError::Encoding { line });
    }
    if trimmed.len() != LINE_LENGTH {
        return Err(ParseError::LineLength { line, length: trimmed.len() });
    }
    let bytes = trimmed.as_bytes();
    if bytes[0] != b'0' + line || bytes[1] != b' ' {
        return Err(ParseError::LineNumber { line });
    }
    let found = match bytes[CHECKSUM] {
        d @ b'0'..=b'9' => d - b'0',
        _ => return Err(ParseError::Checksum { line, expected: checksum(trimmed), found: u8::MAX }),
    };
    let expected = checksum(trimmed);
    if expected != found {
        return Err(ParseError::Checksum { line, expected, found });
    }
    Ok(trimmed)
}

/// Five columns, either plain digits or the alpha-5 form where a leading letter
/// (A-Z without I and O) stands for 10 to 33 ten-thousands.
pub(super) fn parse_catalog_number(field: &str) -> Result<u32, ParseError> {
    let invalid = ParseError::InvalidField(ElementField::CatalogNumber);
    let trimmed = field.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(lead) if lead.is_ascii_uppercase() => {
            if lead == 'I' || lead == 'O' {
                return Err(invalid);
            }
            let skipped = u32::from(lead > 'I') + u32::from(lead > 'O');
            let prefix = u32::from(lead) - u32::from('A') + 10 - skipped;
            let rest = chars.as_str();
            if rest.len() != 4 || !rest.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid);
            }
            let low = rest.parse::<u32>().map_err(|_| invalid.clone())?;
            Ok(prefix * 10_000 + low)
        }
        Some(_) if trimmed.bytes().all(|b| b.is_ascii_digit()) => {
            trimmed.parse::<u32>().map_err(|_| invalid)
        }
        _ => Err(invalid),
    }
}

fn parse_float(field: &str, kind: ElementField) -> Result<f64, ParseError> {
    let trimmed = field.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit() || b"+-.".contains(&b)) {
        return Err(ParseError::InvalidField(kind));
    }
    let value = trimmed.parse::<f64>().map_err(|_| ParseError::InvalidField(kind))?;
    if value.is_finite() { Ok(value) } else { Err(ParseError::OutOfRange(kind)) }
}

fn parse_angle(field: &str, kind: ElementField, max_deg: f64) -> Result<f64, ParseError> {
    let value = parse_float(field, kind)?;
    if (0.0..=max_deg).contains(&value) { Ok(value) } else { Err(ParseError::OutOfRange(kind)) }
}

/// Digits with an implied leading decimal point, e.g. `0006703` -> `0.0006703`.
fn parse_implied_fraction(field: &str, kind: ElementField) -> Result<f64, ParseError> {
    let trimmed = field.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidField(kind));
    }
    format!("0.{trimmed}").parse::<f64>().map_err(|_| ParseError::InvalidField(kind))
}

/// Two-digit year (57-99 -> 19xx, 00-56 -> 20xx) and fractional day of year.
/// The fraction is evaluated in integer nanoseconds so the epoch round-trips exactly.
fn parse_epoch(
    year_field: &str,
    day_field: &str,
) -> Result<chrono::DateTime<chrono::Utc>, ParseError> {
    if !year_field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidField(ElementField::EpochYear));
    }
    let two_digit = year_field
        .parse::<i32>()
        .map_err(|_| ParseError::InvalidField(ElementField::EpochYear))?;
    let year = if two_digit < 57 { 2000 + two_digit } else { 1900 + two_digit };

    let invalid_day = ParseError::InvalidField(ElementField::EpochDay);
    let (day_part, fraction_part) = day_field.trim().split_once('.').unwrap_or((day_field.trim(), ""));
    if day_part.is_empty()
        || !day_part.bytes().all(|b| b.is_ascii_digit())
        || !fraction_part.bytes().all(|b| b.is_ascii_digit())
        || fraction_part.len() > 12
    {
        return Err(invalid_day);
    }
    let day_of_year = day_part.parse::<u32>().map_err(|_| invalid_day.clone())?;
    let midnight = NaiveDate::from_yo_opt(year, day_of_year)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or(ParseError::OutOfRange(ElementField::EpochDay))?
        .and_utc();

    let fraction_nanos = if fraction_part.is_empty() {
        0
    } else {
        let numerator = fraction_part.parse::<u128>().map_err(|_| invalid_day)?;
        let denominator = 10u128.pow(u32::try_from(fraction_part.len()).unwrap_or(12));
        numerator * NANOS_PER_DAY / denominator
    };
    // below one day, always fits
    #[allow(clippy::cast_possible_truncation)]
    let fraction = TimeDelta::nanoseconds(fraction_nanos as i64);
    Ok(midnight + fraction)
}
