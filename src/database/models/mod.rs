pub mod cheque;
pub mod contract;
pub mod property;
pub mod tenant;
pub mod user;

pub use cheque::{Cheque, ChequeStatus};
pub use contract::{BillingFrequency, Contract, ContractStatus};
pub use property::{Property, PropertyStatus};
pub use tenant::Tenant;
pub use user::User;

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow};

use crate::database::record::{Record, RecordError};
use crate::filter::{FilterData, FilterError, FilterWhere};

/// How a writable column is entered and coerced from form input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    TextArea,
    Integer,
    Decimal,
    Flag,
    Date,
    Choice(&'static [&'static str]),
    /// Foreign key to `table`, shown by its `display` column (or `#id`)
    Reference {
        table: &'static str,
        display: Option<&'static str>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            default: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }
}

/// A table managed through the generic record screens.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Serialize + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    const SINGULAR: &'static str;
    const PLURAL: &'static str;
    /// Columns accepted from user input
    const FIELDS: &'static [FieldSpec];
    /// Columns the application sets on the caller's behalf
    const SYSTEM_FIELDS: &'static [&'static str] = &[];
    const SEARCH_COLUMNS: &'static [&'static str];
    const STATUS_COLUMN: Option<&'static str> = None;
    const DISPLAY_COLUMN: Option<&'static str> = Some("name");
    const DEFAULT_ORDER: &'static str = "created_at desc, id desc";
    /// Stamp `created_by` with the current user on insert
    const TRACKS_CREATOR: bool = false;

    fn id(&self) -> i64;

    /// Cross-field rules that a single field's kind cannot express
    fn validate(_record: &Record) -> Result<(), RecordError> {
        Ok(())
    }

    fn field(name: &str) -> Option<&'static FieldSpec> {
        Self::FIELDS.iter().find(|f| f.name == name)
    }

    fn status_options() -> &'static [&'static str] {
        match Self::STATUS_COLUMN.and_then(Self::field).map(|f| f.kind) {
            Some(FieldKind::Choice(options)) => options,
            _ => &[],
        }
    }
}

/// Query-string parameters of a listing page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub status: Option<String>,
}

impl ListQuery {
    /// Text search over the entity's search columns AND an exact status match;
    /// each part only when supplied. Newest rows first.
    pub fn to_filter<T: Entity>(&self) -> Result<FilterData, FilterError> {
        let mut where_clause = FilterWhere::new();
        if !T::SEARCH_COLUMNS.is_empty() {
            where_clause = where_clause.contains_present(T::SEARCH_COLUMNS, self.q.as_deref())?;
        }
        if let Some(column) = T::STATUS_COLUMN {
            where_clause = where_clause.eq_present(column, self.status.as_deref())?;
        }
        Ok(FilterData::new(where_clause).order(T::DEFAULT_ORDER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_listing_filter_is_additive() {
        let none = ListQuery::default().to_filter::<Property>().unwrap();
        assert!(none.where_clause.is_empty());
        assert_eq!(none.order.as_deref(), Some("created_at desc, id desc"));

        let both = ListQuery {
            q: Some("Palm".into()),
            status: Some("vacant".into()),
        }
        .to_filter::<Property>()
        .unwrap();
        assert_eq!(both.where_clause.len(), 2);
    }

    #[test]
    fn status_is_ignored_for_entities_without_one() {
        let filter = ListQuery {
            q: None,
            status: Some("vacant".into()),
        }
        .to_filter::<Tenant>()
        .unwrap();
        assert!(filter.where_clause.is_empty());
    }

    #[test]
    fn status_options_come_from_field_kind() {
        assert_eq!(Property::status_options(), &["vacant", "occupied"]);
        assert!(Tenant::status_options().is_empty());
        assert_eq!(Cheque::status_options().first(), Some(&"issued"));
    }
}
