use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{is_valid_identifier, FilterData, FilterOrderInfo, SqlResult};

pub struct Filter {
    table_name: String,
    where_data: FilterWhere,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
    max_limit: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            where_data: FilterWhere::new(),
            order_data: vec![],
            limit: None,
            offset: None,
            max_limit: None,
        })
    }

    /// Upper bound applied to any requested limit.
    pub fn max_limit(mut self, max_limit: Option<i64>) -> Self {
        self.max_limit = max_limit;
        self
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        self.where_data = data.where_clause;
        if let Some(order) = data.order {
            self.order(&order)?;
        }
        if let Some(limit) = data.limit {
            self.limit(limit, data.offset)?;
        }
        Ok(self)
    }

    pub fn order(&mut self, order_spec: &str) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(order_spec)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i64, offset: Option<i64>) -> Result<&mut Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }

        let applied_limit = match self.max_limit {
            Some(max) if limit > max => {
                tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max);
                max
            }
            _ => limit,
        };

        self.limit = Some(applied_limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = self.where_data.generate();
        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            FilterOrder::generate(&self.order_data),
            self.build_limit_clause(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = self.where_data.generate();
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause)
        };
        SqlResult { query, params }
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidTableName("Table name cannot be empty".to_string()));
        }
        if !is_valid_identifier(name) {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_full_select() {
        let mut filter = Filter::new("properties").unwrap();
        filter
            .assign(
                FilterData::new(FilterWhere::new().eq_present("status", Some("occupied")).unwrap())
                    .order("created_at desc, id desc")
                    .limit(5),
            )
            .unwrap();
        let sql = filter.to_sql();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"properties\" WHERE \"status\" = ? ORDER BY \"created_at\" DESC, \"id\" DESC LIMIT 5"
        );
        assert_eq!(sql.params.len(), 1);
    }

    #[test]
    fn count_without_predicates() {
        let filter = Filter::new("tenants").unwrap();
        assert_eq!(filter.to_count_sql().query, "SELECT COUNT(*) AS count FROM \"tenants\"");
    }

    #[test]
    fn caps_limit() {
        let mut filter = Filter::new("properties").unwrap().max_limit(Some(10));
        filter.limit(50, Some(20)).unwrap();
        assert_eq!(filter.to_sql().query, "SELECT * FROM \"properties\" LIMIT 10 OFFSET 20");
        assert!(filter.limit(-1, None).is_err());
        assert!(filter.limit(1, Some(-1)).is_err());
    }

    #[test]
    fn rejects_bad_table_names() {
        assert!(Filter::new("").is_err());
        assert!(Filter::new("properties; --").is_err());
    }
}
