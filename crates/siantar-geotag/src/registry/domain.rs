use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Districts (kecamatan) of Pematang Siantar accepted by the registry.
pub const DISTRICTS: [&str; 8] = [
    "Siantar Barat",
    "Siantar Timur",
    "Siantar Utara",
    "Siantar Selatan",
    "Siantar Marihat",
    "Siantar Marimbun",
    "Siantar Martoba",
    "Siantar Sitalasari",
];

/// Sub-districts (kelurahan) accepted by the registry.
pub const SUB_DISTRICTS: [&str; 14] = [
    "Timbang Galung",
    "Sipispis",
    "Sukadame",
    "Toba",
    "Bah Kapul",
    "Simbolon Purba",
    "Martoba",
    "Sitalasari",
    "Marihat",
    "Marimbun",
    "Teladan",
    "Pahlawan",
    "Proklamasi",
    "Merdeka",
];

pub fn is_known_district(value: &str) -> bool {
    DISTRICTS.contains(&value)
}

pub fn is_known_sub_district(value: &str) -> bool {
    SUB_DISTRICTS.contains(&value)
}

/// Identifier wrapper for registered businesses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessId(pub String);

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the user who submitted a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a business stands alone or belongs to a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    #[serde(rename = "Tunggal", alias = "single")]
    Single,
    #[serde(rename = "Cabang", alias = "branch")]
    Branch,
}

impl NetworkType {
    pub const fn ordered() -> [Self; 2] {
        [Self::Single, Self::Branch]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single establishment",
            Self::Branch => "Branch establishment",
        }
    }

    /// Value stored on the wire and in CSV exports.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Single => "Tunggal",
            Self::Branch => "Cabang",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tunggal" | "single" => Some(Self::Single),
            "cabang" | "branch" => Some(Self::Branch),
            _ => None,
        }
    }
}

/// A latitude/longitude pair reported by the device location sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One registered business.
///
/// Records read back from storage may predate validation, so every text field
/// tolerates being absent and decodes as an empty string; the auditor reports
/// those gaps instead of the loader rejecting the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: BusinessId,
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
    #[serde(alias = "tahunBerdiri")]
    pub founding_year: i32,
    #[serde(default, alias = "deskripsiKegiatan")]
    pub activity_description: String,
    #[serde(alias = "jaringanUsaha")]
    pub network_type: NetworkType,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, alias = "userId")]
    pub submitted_by: UserId,
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Business {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.submitted_by == user
    }
}

/// Access level of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[serde(alias = "admin")]
    Administrator,
    #[serde(alias = "user")]
    Regular,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::Regular => "Regular user",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrator" => Some(Self::Administrator),
            "user" | "regular" => Some(Self::Regular),
            _ => None,
        }
    }
}

/// Caller identity as supplied by the upstream gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub role: UserRole,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Administrator
    }

    /// Administrators see every record; everyone else only their own.
    pub fn can_view(&self, business: &Business) -> bool {
        self.is_admin() || business.is_owned_by(&self.id)
    }

    pub fn can_delete(&self, business: &Business) -> bool {
        self.can_view(business)
    }
}
