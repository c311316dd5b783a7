use serde_json::Value;
use std::collections::HashMap;

use super::escape;
use crate::database::models::{Entity, FieldKind, FieldSpec};

/// Reference choices per field name, as `(id, label)`
pub type ReferenceOptions = Vec<(&'static str, Vec<(i64, String)>)>;

/// Everything needed to draw a create or edit form
pub struct FormView<'a> {
    pub action: &'a str,
    pub submit: &'a str,
    pub values: &'a HashMap<String, String>,
    /// `(field, message)` of the rejected input, if any
    pub error: Option<(&'a str, &'a str)>,
    pub references: &'a ReferenceOptions,
}

/// Current column values of `entity` as form strings.
pub fn values_from_entity<T: Entity>(entity: &T) -> HashMap<String, String> {
    let json = serde_json::to_value(entity).unwrap_or(Value::Null);
    T::FIELDS
        .iter()
        .map(|spec| {
            let text = match json.get(spec.name) {
                Some(Value::Bool(true)) => "on".to_string(),
                Some(value) => display_value(value),
                None => String::new(),
            };
            (spec.name.to_string(), text)
        })
        .collect()
}

/// Plain-text rendering of a stored value; NULL and `false` render empty.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "Yes".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub fn record_form(specs: &[FieldSpec], view: &FormView<'_>) -> String {
    let mut html = String::new();
    if let Some((_, message)) = view.error {
        html.push_str(&format!("<p class=\"error\">{}</p>", escape(message)));
    }
    html.push_str(&format!("<form method=\"post\" action=\"{}\">", escape(view.action)));
    for spec in specs {
        let value = view.values.get(spec.name).map(String::as_str).unwrap_or_default();
        let invalid = view.error.map_or(false, |(field, _)| field == spec.name);
        html.push_str(&field_html(spec, value, invalid, view.references));
    }
    html.push_str(&format!("<p><button type=\"submit\">{}</button></p></form>", escape(view.submit)));
    html
}

fn field_html(spec: &FieldSpec, value: &str, invalid: bool, references: &ReferenceOptions) -> String {
    let name = spec.name;
    let required = if spec.required { " required" } else { "" };
    let class = if invalid { " class=\"error\"" } else { "" };
    let label = format!(
        "<label for=\"{}\"{}>{}{}</label>",
        name,
        class,
        escape(spec.label),
        if spec.required { " *" } else { "" }
    );

    let input = match spec.kind {
        FieldKind::Text => text_input(name, "text", value, required, ""),
        FieldKind::Integer => text_input(name, "number", value, required, " min=\"0\" step=\"1\""),
        FieldKind::Decimal => text_input(name, "number", value, required, " min=\"0\" step=\"any\""),
        FieldKind::Date => text_input(name, "date", value, required, ""),
        FieldKind::TextArea => format!(
            "<textarea id=\"{name}\" name=\"{name}\" rows=\"4\"{required}>{}</textarea>",
            escape(value)
        ),
        FieldKind::Flag => {
            let checked = matches!(value.to_ascii_lowercase().as_str(), "on" | "true" | "1" | "yes");
            format!(
                "<input type=\"checkbox\" id=\"{name}\" name=\"{name}\"{}>",
                if checked { " checked" } else { "" }
            )
        }
        FieldKind::Choice(options) => {
            let options = options.iter().map(|o| (o.to_string(), o.to_string()));
            select(name, value, required, spec.default.is_some(), options)
        }
        FieldKind::Reference { .. } => {
            let rows = references
                .iter()
                .find(|(field, _)| *field == name)
                .map(|(_, rows)| rows.as_slice())
                .unwrap_or_default();
            let options = rows.iter().map(|(id, label)| (id.to_string(), label.clone()));
            select(name, value, required, false, options)
        }
    };
    format!("<p>{}{}</p>", label, input)
}

fn text_input(name: &str, kind: &str, value: &str, required: &str, extra: &str) -> String {
    format!(
        "<input type=\"{kind}\" id=\"{name}\" name=\"{name}\" value=\"{}\"{required}{extra}>",
        escape(value)
    )
}

/// A `<select>` with a leading blank option unless the field has a default.
fn select(
    name: &str,
    selected: &str,
    required: &str,
    has_default: bool,
    options: impl Iterator<Item = (String, String)>,
) -> String {
    let mut html = format!("<select id=\"{name}\" name=\"{name}\"{required}>");
    if !has_default {
        html.push_str("<option value=\"\"></option>");
    }
    for (value, label) in options {
        let mark = if value == selected { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            escape(&value),
            mark,
            escape(&label)
        ));
    }
    html.push_str("</select>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Contract, Property};

    #[test]
    fn form_keeps_submitted_values_escaped() {
        let mut values = HashMap::new();
        values.insert("name".to_string(), "Villa \"12\"".to_string());
        values.insert("status".to_string(), "occupied".to_string());
        values.insert("furnished".to_string(), "on".to_string());
        let refs = ReferenceOptions::new();
        let html = record_form(
            Property::FIELDS,
            &FormView {
                action: "/properties",
                submit: "Create",
                values: &values,
                error: Some(("name", "Missing <name>")),
                references: &refs,
            },
        );
        assert!(html.contains("value=\"Villa &quot;12&quot;\""));
        assert!(html.contains("<option value=\"occupied\" selected>"));
        assert!(html.contains("name=\"furnished\" checked"));
        assert!(html.contains("Missing &lt;name&gt;"));
    }

    #[test]
    fn reference_fields_list_existing_rows() {
        let refs: ReferenceOptions = vec![
            ("property_id", vec![(3, "Villa 12".to_string())]),
            ("tenant_id", vec![(9, "Sara".to_string())]),
        ];
        let mut values = HashMap::new();
        values.insert("tenant_id".to_string(), "9".to_string());
        let html = record_form(
            Contract::FIELDS,
            &FormView {
                action: "/contracts",
                submit: "Create",
                values: &values,
                error: None,
                references: &refs,
            },
        );
        assert!(html.contains("<option value=\"3\">Villa 12</option>"));
        assert!(html.contains("<option value=\"9\" selected>Sara</option>"));
    }

    #[test]
    fn display_value_formats_scalars() {
        assert_eq!(display_value(&Value::Null), "");
        assert_eq!(display_value(&serde_json::json!(4)), "4");
        assert_eq!(display_value(&serde_json::json!(true)), "Yes");
        assert_eq!(display_value(&serde_json::json!("x")), "x");
    }
}
