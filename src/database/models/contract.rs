use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Entity, FieldKind, FieldSpec};
use crate::database::record::{Record, RecordError};

pub const CONTRACT_STATUSES: &[&str] = &["active", "expired", "terminated"];
pub const BILLING_FREQUENCIES: &[&str] = &["monthly", "quarterly", "semiannual", "annual"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ContractStatus {
    Active,
    Expired,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BillingFrequency {
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Contract {
    pub id: i64,
    pub property_id: i64,
    pub tenant_id: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub rent_amount: Option<f64>,
    pub billing_frequency: BillingFrequency,
    pub deposit_amount: Option<f64>,
    pub status: ContractStatus,
    pub renewal_notice_days: i64,
    pub terms: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Contract {
    const TABLE: &'static str = "contracts";
    const SINGULAR: &'static str = "Contract";
    const PLURAL: &'static str = "Contracts";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new(
            "property_id",
            "Property",
            FieldKind::Reference { table: "properties", display: Some("name") },
        )
        .required(),
        FieldSpec::new(
            "tenant_id",
            "Tenant",
            FieldKind::Reference { table: "tenants", display: Some("name") },
        )
        .required(),
        FieldSpec::new("start_date", "Start date", FieldKind::Date),
        FieldSpec::new("end_date", "End date", FieldKind::Date),
        FieldSpec::new("rent_amount", "Rent amount", FieldKind::Decimal),
        FieldSpec::new("billing_frequency", "Billing frequency", FieldKind::Choice(BILLING_FREQUENCIES))
            .default_value("monthly"),
        FieldSpec::new("deposit_amount", "Deposit amount", FieldKind::Decimal),
        FieldSpec::new("status", "Status", FieldKind::Choice(CONTRACT_STATUSES)).default_value("active"),
        FieldSpec::new("renewal_notice_days", "Renewal notice (days)", FieldKind::Integer).default_value("60"),
        FieldSpec::new("terms", "Terms", FieldKind::TextArea),
    ];
    const SEARCH_COLUMNS: &'static [&'static str] = &["terms"];
    const STATUS_COLUMN: Option<&'static str> = Some("status");
    const DISPLAY_COLUMN: Option<&'static str> = None;

    fn id(&self) -> i64 {
        self.id
    }

    fn validate(record: &Record) -> Result<(), RecordError> {
        let start = record.get("start_date").and_then(|v| v.as_str());
        let end = record.get("end_date").and_then(|v| v.as_str());
        if let (Some(start), Some(end)) = (start, end) {
            // ISO dates order lexically
            if end <= start {
                return Err(RecordError::InvalidValue {
                    field: "end_date".to_string(),
                    message: "End date must be after the start date".to_string(),
                });
            }
        }
        Ok(())
    }
}
