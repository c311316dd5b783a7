use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Entity, FieldKind, FieldSpec};

pub const CHEQUE_STATUSES: &[&str] = &["issued", "deposited", "cleared", "bounced"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ChequeStatus {
    Issued,
    Deposited,
    Cleared,
    Bounced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Cheque {
    pub id: i64,
    pub contract_id: i64,
    pub cheque_number: Option<String>,
    pub bank_name: Option<String>,
    pub amount: Option<f64>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: ChequeStatus,
    pub created_at: DateTime<Utc>,
}

impl Entity for Cheque {
    const TABLE: &'static str = "cheques";
    const SINGULAR: &'static str = "Cheque";
    const PLURAL: &'static str = "Cheques";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("contract_id", "Contract", FieldKind::Reference { table: "contracts", display: None })
            .required(),
        FieldSpec::new("cheque_number", "Cheque number", FieldKind::Text),
        FieldSpec::new("bank_name", "Bank", FieldKind::Text),
        FieldSpec::new("amount", "Amount", FieldKind::Decimal),
        FieldSpec::new("issue_date", "Issue date", FieldKind::Date),
        FieldSpec::new("due_date", "Due date", FieldKind::Date),
        FieldSpec::new("status", "Status", FieldKind::Choice(CHEQUE_STATUSES)).default_value("issued"),
    ];
    const SEARCH_COLUMNS: &'static [&'static str] = &["cheque_number", "bank_name"];
    const STATUS_COLUMN: Option<&'static str> = Some("status");
    const DISPLAY_COLUMN: Option<&'static str> = Some("cheque_number");

    fn id(&self) -> i64 {
        self.id
    }
}
