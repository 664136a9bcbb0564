use std::collections::HashSet;

use serde::Serialize;

use super::domain::{Business, BusinessId};

/// Fields every record is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    LegalName,
    Address,
    District,
    SubDistrict,
    Phone,
    Email,
}

impl RequiredField {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::LegalName,
            Self::Address,
            Self::District,
            Self::SubDistrict,
            Self::Phone,
            Self::Email,
        ]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::LegalName => "legal_name",
            Self::Address => "address",
            Self::District => "district",
            Self::SubDistrict => "sub_district",
            Self::Phone => "phone",
            Self::Email => "email",
        }
    }

    fn value(self, business: &Business) -> &str {
        match self {
            Self::LegalName => &business.legal_name,
            Self::Address => &business.address,
            Self::District => &business.district,
            Self::SubDistrict => &business.sub_district,
            Self::Phone => &business.phone,
            Self::Email => &business.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingFieldsReport {
    pub id: BusinessId,
    pub business_name: String,
    pub fields: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateReport {
    pub id: BusinessId,
    pub name: String,
    pub address: String,
}

/// Advisory data-quality findings for human review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub total: usize,
    pub missing: Vec<MissingFieldsReport>,
    pub duplicates: Vec<DuplicateReport>,
}

impl AuditReport {
    /// Records with every required field filled in.
    pub fn complete(&self) -> usize {
        self.total.saturating_sub(self.missing.len())
    }

    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.duplicates.is_empty()
    }
}

fn missing_fields(business: &Business) -> Vec<&'static str> {
    RequiredField::ordered()
        .into_iter()
        .filter(|field| field.value(business).is_empty())
        .map(RequiredField::name)
        .collect()
}

/// Reports records with empty required fields and records sharing a name and
/// address (case-insensitively) with another record.
///
/// The duplicate scan compares every pair, O(n²) in the number of records.
/// That is fine for one municipality's registry in the low thousands; it is not
/// meant for larger collections.
pub fn audit(records: &[Business]) -> AuditReport {
    let keys: Vec<(String, String)> = records
        .iter()
        .map(|business| {
            (
                business.legal_name.to_lowercase(),
                business.address.to_lowercase(),
            )
        })
        .collect();

    let mut missing = Vec::new();
    let mut duplicates = Vec::new();
    let mut reported: HashSet<&BusinessId> = HashSet::new();

    for (index, business) in records.iter().enumerate() {
        let fields = missing_fields(business);
        if !fields.is_empty() {
            missing.push(MissingFieldsReport {
                id: business.id.clone(),
                business_name: business.legal_name.clone(),
                fields,
            });
        }

        let key = &keys[index];
        let has_twin = keys
            .iter()
            .enumerate()
            .any(|(other, candidate)| other != index && candidate == key);

        if has_twin && reported.insert(&business.id) {
            duplicates.push(DuplicateReport {
                id: business.id.clone(),
                name: business.legal_name.clone(),
                address: business.address.clone(),
            });
        }
    }

    AuditReport {
        total: records.len(),
        missing,
        duplicates,
    }
}
