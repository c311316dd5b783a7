use super::error::FilterError;
use super::types::{is_valid_identifier, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parses `"created_at desc, id desc"` style specifications.
    pub fn validate_and_parse(order: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in order.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                if !is_valid_identifier(col) {
                    return Err(FilterError::InvalidColumn(format!("Invalid order column: {}", col)));
                }
                let sort = match it.next() {
                    None => SortDirection::Asc,
                    Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                    Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                    Some(dir) => {
                        return Err(FilterError::InvalidOperatorData(format!("Invalid sort direction: {}", dir)))
                    }
                };
                out.push(FilterOrderInfo { column: col.to_string(), sort });
            }
        }
        Ok(out)
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multi_column_order() {
        let infos = FilterOrder::validate_and_parse("created_at desc, id DESC,name").unwrap();
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].sort, SortDirection::Desc);
        assert_eq!(infos[2].column, "name");
        assert_eq!(infos[2].sort, SortDirection::Asc);
        assert_eq!(
            FilterOrder::generate(&infos),
            "ORDER BY \"created_at\" DESC, \"id\" DESC, \"name\" ASC"
        );
    }

    #[test]
    fn rejects_injection_in_order() {
        assert!(FilterOrder::validate_and_parse("name; DROP TABLE users").is_err());
        assert!(FilterOrder::validate_and_parse("name sideways").is_err());
        assert_eq!(FilterOrder::generate(&[]), "");
    }
}
