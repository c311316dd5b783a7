use serde_json::Value;

use super::error::FilterError;
use super::types::{is_valid_identifier, FilterOp, FilterWhereInfo};

/// Accumulates named predicates and their bound parameters, joined with AND.
///
/// The `*_present` methods skip the predicate entirely when the caller did not
/// supply a value, so an absent filter never turns into a wildcard match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterWhere {
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = value`, or `column IS NULL` for a null value
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Result<Self, FilterError> {
        Self::validate_column(column)?;
        self.conditions.push(FilterWhereInfo {
            columns: vec![column.to_string()],
            operator: FilterOp::Eq,
            data: value.into(),
        });
        Ok(self)
    }

    pub fn eq_present(self, column: &str, value: Option<&str>) -> Result<Self, FilterError> {
        match Self::present(value) {
            Some(v) => self.eq(column, v),
            None => Ok(self),
        }
    }

    /// Any of `columns` contains `text` as a literal substring
    pub fn contains_any(mut self, columns: &[&str], text: &str) -> Result<Self, FilterError> {
        if columns.is_empty() {
            return Err(FilterError::InvalidOperatorData(
                "substring match needs at least one column".to_string(),
            ));
        }
        for column in columns {
            Self::validate_column(column)?;
        }
        self.conditions.push(FilterWhereInfo {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            operator: FilterOp::Contains,
            data: Value::String(text.to_string()),
        });
        Ok(self)
    }

    pub fn contains_present(self, columns: &[&str], text: Option<&str>) -> Result<Self, FilterError> {
        match Self::present(text) {
            Some(t) => self.contains_any(columns, t),
            None => Ok(self),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Render the predicate list as SQL with `?` placeholders, in bind order.
    /// An empty builder renders as an empty string.
    pub fn generate(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let parts: Vec<String> = self
            .conditions
            .iter()
            .map(|condition| Self::build_sql_condition(condition, &mut params))
            .collect();
        (parts.join(" AND "), params)
    }

    fn build_sql_condition(condition: &FilterWhereInfo, params: &mut Vec<Value>) -> String {
        match condition.operator {
            FilterOp::Eq => {
                let quoted_column = format!("\"{}\"", condition.columns[0]);
                if condition.data.is_null() {
                    format!("{} IS NULL", quoted_column)
                } else {
                    params.push(condition.data.clone());
                    format!("{} = ?", quoted_column)
                }
            }
            FilterOp::Contains => {
                let pattern = like_pattern(condition.data.as_str().unwrap_or_default());
                let alternatives: Vec<String> = condition
                    .columns
                    .iter()
                    .map(|column| {
                        params.push(Value::String(pattern.clone()));
                        format!("\"{}\" LIKE ? ESCAPE '\\'", column)
                    })
                    .collect();
                format!("({})", alternatives.join(" OR "))
            }
        }
    }

    fn present(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    fn validate_column(column: &str) -> Result<(), FilterError> {
        if is_valid_identifier(column) {
            Ok(())
        } else {
            Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)))
        }
    }
}

/// Wraps `text` in `%` wildcards, escaping LIKE metacharacters with `\`.
pub fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_builder_renders_nothing() {
        let (sql, params) = FilterWhere::new().generate();
        assert_eq!(sql, "");
        assert!(params.is_empty());
    }

    #[test]
    fn absent_parameters_add_no_predicate() {
        let filter = FilterWhere::new()
            .contains_present(&["name", "address"], None)
            .unwrap()
            .contains_present(&["name", "address"], Some("   "))
            .unwrap()
            .eq_present("status", Some(""))
            .unwrap()
            .eq_present("status", None)
            .unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn text_and_status_are_conjoined_and_bound() {
        let (sql, params) = FilterWhere::new()
            .contains_present(&["name", "address"], Some("Palm"))
            .unwrap()
            .eq_present("status", Some("vacant"))
            .unwrap()
            .generate();

        assert_eq!(
            sql,
            "(\"name\" LIKE ? ESCAPE '\\' OR \"address\" LIKE ? ESCAPE '\\') AND \"status\" = ?"
        );
        assert_eq!(params, vec![json!("%Palm%"), json!("%Palm%"), json!("vacant")]);
    }

    #[test]
    fn values_never_reach_sql_text() {
        let hostile = "x' OR '1'='1";
        let (sql, params) = FilterWhere::new()
            .contains_any(&["name"], hostile)
            .unwrap()
            .generate();
        assert!(!sql.contains(hostile));
        assert_eq!(params, vec![json!("%x' OR '1'='1%")]);
    }

    #[test]
    fn null_equality_uses_is_null() {
        let (sql, params) = FilterWhere::new().eq("created_by", Value::Null).unwrap().generate();
        assert_eq!(sql, "\"created_by\" IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn rejects_bad_columns() {
        assert!(FilterWhere::new().eq("status = 1 --", "x").is_err());
        assert!(FilterWhere::new().contains_any(&[], "x").is_err());
        assert!(FilterWhere::new().contains_any(&["name", "a b"], "x").is_err());
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("Palm"), "%Palm%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
