use std::io::{Read, Write};

use serde::{Deserialize, Deserializer, Serialize};

use super::domain::Business;
use super::submission::{BusinessSubmission, LocationReading};

const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    legal_name: &'a str,
    commercial_name: &'a str,
    address: &'a str,
    district: &'a str,
    sub_district: &'a str,
    sls_code: &'a str,
    phone: &'a str,
    email: &'a str,
    founding_year: i32,
    activity_description: &'a str,
    network_type: &'static str,
    latitude: f64,
    longitude: f64,
    submitted_by: &'a str,
    created_at: String,
}

impl<'a> From<&'a Business> for ExportRow<'a> {
    fn from(business: &'a Business) -> Self {
        Self {
            id: &business.id.0,
            legal_name: &business.legal_name,
            commercial_name: &business.commercial_name,
            address: &business.address,
            district: &business.district,
            sub_district: &business.sub_district,
            sls_code: &business.sls_code,
            phone: &business.phone,
            email: &business.email,
            founding_year: business.founding_year,
            activity_description: &business.activity_description,
            network_type: business.network_type.code(),
            latitude: business.latitude,
            longitude: business.longitude,
            submitted_by: &business.submitted_by.0,
            created_at: business.created_at.format(EXPORT_TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Writes records as CSV with a header row, in the order given.
pub fn write_csv<W: Write>(records: &[Business], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for business in records {
        csv_writer.serialize(ExportRow::from(business))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// One survey sheet row, keyed by its 1-based data line for error reporting.
///
/// A row whose cells cannot be decoded carries the decoding error instead of
/// a submission, so one bad cell never hides the rows around it.
#[derive(Debug, Clone)]
pub struct ImportedRow {
    pub line: usize,
    pub submission: Result<BusinessSubmission, String>,
}

#[derive(Debug, Deserialize)]
struct ImportRow {
    #[serde(alias = "namaUsaha", default)]
    legal_name: String,
    #[serde(alias = "namaKomersil", default)]
    commercial_name: String,
    #[serde(alias = "alamat", default)]
    address: String,
    #[serde(alias = "kecamatan", default)]
    district: String,
    #[serde(alias = "kelurahan", default)]
    sub_district: String,
    #[serde(alias = "kodeSLS", default)]
    sls_code: String,
    #[serde(alias = "telepon", default)]
    phone: String,
    #[serde(default)]
    email: String,
    #[serde(alias = "tahunBerdiri", default)]
    founding_year: Option<i32>,
    #[serde(alias = "deskripsiKegiatan", default)]
    activity_description: String,
    #[serde(
        alias = "jaringanUsaha",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    network_type: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl ImportRow {
    fn into_submission(self) -> BusinessSubmission {
        let location = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(LocationReading::Fixed {
                latitude,
                longitude,
            }),
            _ => None,
        };

        BusinessSubmission {
            legal_name: self.legal_name,
            commercial_name: self.commercial_name,
            address: self.address,
            district: self.district,
            sub_district: self.sub_district,
            sls_code: self.sls_code,
            phone: self.phone,
            email: self.email,
            founding_year: self.founding_year,
            activity_description: self.activity_description,
            network_type: self.network_type,
            location,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Parses a survey sheet into submissions; validation happens on intake.
///
/// Header, encoding, and I/O failures abort the whole sheet. Cells that do not
/// decode (a non-numeric year, a stray column) only reject their own row.
pub fn read_submissions<R: Read>(reader: R) -> Result<Vec<ImportedRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        let line = index + 1;
        let submission = match record {
            Ok(record) => record
                .deserialize::<ImportRow>(Some(&headers))
                .map(ImportRow::into_submission)
                .map_err(|err| format!("row could not be read: {err}")),
            Err(err) if is_row_error(&err) => Err(format!("row could not be read: {err}")),
            Err(err) => return Err(err),
        };
        rows.push(ImportedRow { line, submission });
    }

    Ok(rows)
}

fn is_row_error(err: &csv::Error) -> bool {
    matches!(
        err.kind(),
        csv::ErrorKind::UnequalLengths { .. } | csv::ErrorKind::Deserialize { .. }
    )
}
