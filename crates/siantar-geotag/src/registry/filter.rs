use serde::{Deserialize, Serialize};

use super::domain::Business;

/// Search and area selectors applied to a record snapshot.
///
/// Empty strings behave exactly like absent criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default, alias = "q")]
    pub text: Option<String>,
    #[serde(default, alias = "kecamatan")]
    pub district: Option<String>,
    #[serde(default, alias = "kelurahan")]
    pub sub_district: Option<String>,
}

impl FilterCriteria {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn district(district: impl Into<String>) -> Self {
        Self {
            district: Some(district.into()),
            ..Self::default()
        }
    }

    pub fn with_sub_district(mut self, sub_district: impl Into<String>) -> Self {
        self.sub_district = Some(sub_district.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        active(&self.text).is_none()
            && active(&self.district).is_none()
            && active(&self.sub_district).is_none()
    }

    fn compile(&self) -> CompiledCriteria<'_> {
        CompiledCriteria {
            needle: active(&self.text).map(str::to_lowercase),
            district: active(&self.district),
            sub_district: active(&self.sub_district),
        }
    }

    pub fn matches(&self, business: &Business) -> bool {
        self.compile().matches(business)
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

struct CompiledCriteria<'a> {
    needle: Option<String>,
    district: Option<&'a str>,
    sub_district: Option<&'a str>,
}

impl CompiledCriteria<'_> {
    fn matches(&self, business: &Business) -> bool {
        if let Some(needle) = &self.needle {
            let hit = [
                &business.legal_name,
                &business.commercial_name,
                &business.address,
            ]
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle.as_str()));
            if !hit {
                return false;
            }
        }

        if let Some(district) = self.district {
            if business.district != district {
                return false;
            }
        }

        if let Some(sub_district) = self.sub_district {
            if business.sub_district != sub_district {
                return false;
            }
        }

        true
    }
}

/// Returns the records matching every active criterion, in input order.
pub fn filter<'a>(records: &'a [Business], criteria: &FilterCriteria) -> Vec<&'a Business> {
    let compiled = criteria.compile();
    records
        .iter()
        .filter(|business| compiled.matches(business))
        .collect()
}
