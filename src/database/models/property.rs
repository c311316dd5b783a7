use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Entity, FieldKind, FieldSpec};

pub const PROPERTY_STATUSES: &[&str] = &["vacant", "occupied"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PropertyStatus {
    Vacant,
    Occupied,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Vacant => "vacant",
            PropertyStatus::Occupied => "occupied",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub status: PropertyStatus,
    pub utility_ref: Option<String>,
    pub unit_type: Option<String>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub size_sqft: Option<f64>,
    pub furnished: bool,
    pub price: Option<f64>,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Property {
    const TABLE: &'static str = "properties";
    const SINGULAR: &'static str = "Property";
    const PLURAL: &'static str = "Properties";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("name", "Name", FieldKind::Text).required(),
        FieldSpec::new("address", "Address", FieldKind::Text),
        FieldSpec::new("status", "Status", FieldKind::Choice(PROPERTY_STATUSES)).default_value("vacant"),
        FieldSpec::new("utility_ref", "Utility reference no.", FieldKind::Text),
        FieldSpec::new("unit_type", "Unit type", FieldKind::Text),
        FieldSpec::new("bedrooms", "Bedrooms", FieldKind::Integer),
        FieldSpec::new("bathrooms", "Bathrooms", FieldKind::Integer),
        FieldSpec::new("size_sqft", "Size (sq ft)", FieldKind::Decimal),
        FieldSpec::new("furnished", "Furnished", FieldKind::Flag),
        FieldSpec::new("price", "Price", FieldKind::Decimal),
        FieldSpec::new("notes", "Notes", FieldKind::TextArea),
    ];
    const SYSTEM_FIELDS: &'static [&'static str] = &["created_by"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "address"];
    const STATUS_COLUMN: Option<&'static str> = Some("status");
    const TRACKS_CREATOR: bool = true;

    fn id(&self) -> i64 {
        self.id
    }
}
