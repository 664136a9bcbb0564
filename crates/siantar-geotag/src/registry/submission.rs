use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::domain::{
    is_known_district, is_known_sub_district, Business, BusinessId, Coordinates, NetworkType,
    UserId,
};

pub const MIN_FOUNDING_YEAR: i32 = 1900;

/// Form payload captured by a field officer before it becomes a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessSubmission {
    #[serde(default, alias = "namaUsaha")]
    pub legal_name: String,
    #[serde(default, alias = "namaKomersil")]
    pub commercial_name: String,
    #[serde(default, alias = "alamat")]
    pub address: String,
    #[serde(default, alias = "kecamatan")]
    pub district: String,
    #[serde(default, alias = "kelurahan")]
    pub sub_district: String,
    #[serde(default, alias = "kodeSLS")]
    pub sls_code: String,
    #[serde(default, alias = "telepon")]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "tahunBerdiri")]
    pub founding_year: Option<i32>,
    #[serde(default, alias = "deskripsiKegiatan")]
    pub activity_description: String,
    #[serde(default, alias = "jaringanUsaha")]
    pub network_type: Option<String>,
    #[serde(default)]
    pub location: Option<LocationReading>,
}

/// Outcome reported by the device geolocation collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocationReading {
    Fixed { latitude: f64, longitude: f64 },
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl LocationReading {
    pub fn into_coordinates(self) -> Result<Coordinates, LocationError> {
        match self {
            Self::Fixed {
                latitude,
                longitude,
            } => {
                let in_range = latitude.is_finite()
                    && longitude.is_finite()
                    && (-90.0..=90.0).contains(&latitude)
                    && (-180.0..=180.0).contains(&longitude);
                if in_range {
                    Ok(Coordinates {
                        latitude,
                        longitude,
                    })
                } else {
                    Err(LocationError::OutOfRange {
                        latitude,
                        longitude,
                    })
                }
            }
            Self::PermissionDenied => Err(LocationError::PermissionDenied),
            Self::PositionUnavailable => Err(LocationError::PositionUnavailable),
            Self::Timeout => Err(LocationError::Timeout),
        }
    }
}

/// Reasons a submission is refused for lack of a usable location fix.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("location has not been captured; take a location fix before submitting")]
    NotCaptured,
    #[error("location access was denied; enable GPS and grant location permission")]
    PermissionDenied,
    #[error("location information is unavailable")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("reported location ({latitude}, {longitude}) is outside valid coordinate bounds")]
    OutOfRange { latitude: f64, longitude: f64 },
}

/// Per-field validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Why a submission could not become a record.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error(transparent)]
    Location(#[from] LocationError),
}

fn sls_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("SLS pattern compiles"))
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\+62|62|0)[0-9]{9,12}$").expect("phone pattern compiles"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern compiles")
    })
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let length = value.chars().count();
    if length < min {
        errors.push(field, format!("{label} must be at least {min} characters"));
    } else if length > max {
        errors.push(field, format!("{label} must be at most {max} characters"));
    }
}

/// Checks every field and returns all problems at once.
///
/// The founding-year ceiling is the year of `submitted_at`, so the same
/// submission validates identically no matter when it is replayed.
pub fn validate(
    submission: &BusinessSubmission,
    submitted_at: DateTime<Utc>,
) -> Result<NetworkType, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_length(
        &mut errors,
        "legal_name",
        "Business name",
        &submission.legal_name,
        3,
        100,
    );
    check_length(
        &mut errors,
        "commercial_name",
        "Commercial name",
        &submission.commercial_name,
        3,
        100,
    );
    check_length(&mut errors, "address", "Address", &submission.address, 10, 200);

    if !is_known_district(&submission.district) {
        errors.push("district", "Select a valid district");
    }
    if !is_known_sub_district(&submission.sub_district) {
        errors.push("sub_district", "Select a valid sub-district");
    }
    if !sls_pattern().is_match(&submission.sls_code) {
        errors.push("sls_code", "SLS code must be exactly 10 digits");
    }
    if !phone_pattern().is_match(&submission.phone) {
        errors.push("phone", "Phone number format is invalid");
    }
    if !email_pattern().is_match(&submission.email) {
        errors.push("email", "Email format is invalid");
    }

    let current_year = submitted_at.year();
    match submission.founding_year {
        None => errors.push("founding_year", "Founding year is required"),
        Some(year) if year < MIN_FOUNDING_YEAR => {
            errors.push("founding_year", format!("Year must be {MIN_FOUNDING_YEAR} or later"))
        }
        Some(year) if year > current_year => errors.push(
            "founding_year",
            format!("Year cannot be later than {current_year}"),
        ),
        Some(_) => {}
    }

    check_length(
        &mut errors,
        "activity_description",
        "Activity description",
        &submission.activity_description,
        20,
        500,
    );

    let network_type = submission.network_type.as_deref().and_then(NetworkType::parse);
    if network_type.is_none() {
        errors.push("network_type", "Select a business network type");
    }

    match network_type {
        Some(network_type) if errors.is_empty() => Ok(network_type),
        _ => Err(errors),
    }
}

/// Builds a record from a submission, refusing without a valid location fix.
///
/// Field validation runs first so the caller sees form errors even while the
/// location is still missing.
pub fn build_record(
    submission: BusinessSubmission,
    id: BusinessId,
    submitted_by: UserId,
    submitted_at: DateTime<Utc>,
) -> Result<Business, SubmissionError> {
    let network_type = validate(&submission, submitted_at)?;
    let coordinates = submission
        .location
        .ok_or(LocationError::NotCaptured)?
        .into_coordinates()?;

    Ok(Business {
        id,
        legal_name: submission.legal_name,
        commercial_name: submission.commercial_name,
        address: submission.address,
        district: submission.district,
        sub_district: submission.sub_district,
        sls_code: submission.sls_code,
        phone: submission.phone,
        email: submission.email,
        founding_year: submission.founding_year.unwrap_or_default(),
        activity_description: submission.activity_description,
        network_type,
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
        submitted_by,
        created_at: submitted_at,
    })
}
