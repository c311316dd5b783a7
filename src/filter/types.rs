use serde_json::Value;

use super::filter_where::FilterWhere;

/// Operators understood by the WHERE builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// Literal substring match on any of several columns, OR'ed together
    Contains,
}

/// Everything a listing needs: predicates, ordering and paging.
#[derive(Debug, Clone, Default)]
pub struct FilterData {
    pub where_clause: FilterWhere,
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl FilterData {
    pub fn new(where_clause: FilterWhere) -> Self {
        Self {
            where_clause,
            ..Default::default()
        }
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub columns: Vec<String>,
    pub operator: FilterOp,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

/// Identifiers are spliced into SQL text, so only `[A-Za-z_][A-Za-z0-9_]*` is accepted.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_reject_punctuation() {
        assert!(is_valid_identifier("created_at"));
        assert!(is_valid_identifier("_internal"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1name"));
        assert!(!is_valid_identifier("name; DROP TABLE users"));
        assert!(!is_valid_identifier("na\"me"));
    }
}
