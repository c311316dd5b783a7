use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Entity, FieldKind, FieldSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub id_number: Option<String>,
    pub emergency_contact: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Tenant {
    const TABLE: &'static str = "tenants";
    const SINGULAR: &'static str = "Tenant";
    const PLURAL: &'static str = "Tenants";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("name", "Name", FieldKind::Text).required(),
        FieldSpec::new("phone", "Phone", FieldKind::Text),
        FieldSpec::new("email", "Email", FieldKind::Text),
        FieldSpec::new("id_number", "ID number", FieldKind::Text),
        FieldSpec::new("emergency_contact", "Emergency contact", FieldKind::Text),
        FieldSpec::new("notes", "Notes", FieldKind::TextArea),
    ];
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "phone", "email", "id_number"];

    fn id(&self) -> i64 {
        self.id
    }
}
