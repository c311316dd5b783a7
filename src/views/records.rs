use serde_json::Value;

use super::escape;
use super::forms::{display_value, ReferenceOptions};
use crate::database::models::{Entity, FieldKind, FieldSpec, ListQuery};

/// Heading for one row: its display column, or `Singular #id`.
pub fn record_title<T: Entity>(entity: &T) -> String {
    let json = serde_json::to_value(entity).unwrap_or(Value::Null);
    T::DISPLAY_COLUMN
        .and_then(|column| json.get(column))
        .map(display_value)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("{} #{}", T::SINGULAR, entity.id()))
}

fn cell(spec: &FieldSpec, value: Option<&Value>, references: &ReferenceOptions) -> String {
    let value = value.unwrap_or(&Value::Null);
    if let (FieldKind::Reference { table, .. }, Some(id)) = (spec.kind, value.as_i64()) {
        let label = references
            .iter()
            .find(|(field, _)| *field == spec.name)
            .and_then(|(_, rows)| rows.iter().find(|(row_id, _)| *row_id == id))
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| format!("#{}", id));
        return format!("<a href=\"/{}/{}\">{}</a>", table, id, escape(&label));
    }
    escape(&display_value(value))
}

fn search_form<T: Entity>(query: &ListQuery) -> String {
    let mut html = format!("<form method=\"get\" action=\"/{}\" class=\"search\">", T::TABLE);
    if !T::SEARCH_COLUMNS.is_empty() {
        html.push_str(&format!(
            "<input type=\"search\" name=\"q\" placeholder=\"Search\" value=\"{}\"> ",
            escape(query.q.as_deref().unwrap_or_default())
        ));
    }
    let statuses = T::status_options();
    if !statuses.is_empty() {
        let current = query.status.as_deref().unwrap_or_default();
        html.push_str("<select name=\"status\"><option value=\"\">All statuses</option>");
        for status in statuses {
            let mark = if *status == current { " selected" } else { "" };
            html.push_str(&format!("<option value=\"{status}\"{mark}>{status}</option>"));
        }
        html.push_str("</select> ");
    }
    html.push_str("<button type=\"submit\">Filter</button></form>");
    html
}

pub fn list_page<T: Entity>(rows: &[T], query: &ListQuery, references: &ReferenceOptions) -> String {
    let columns: Vec<&FieldSpec> = T::FIELDS
        .iter()
        .filter(|spec| !matches!(spec.kind, FieldKind::TextArea))
        .collect();

    let mut html = format!(
        "<h1>{}</h1><p><a href=\"/{}/new\">New {}</a></p>{}",
        T::PLURAL,
        T::TABLE,
        T::SINGULAR.to_lowercase(),
        search_form::<T>(query)
    );

    if rows.is_empty() {
        html.push_str(&format!("<p>No {} found.</p>", T::PLURAL.to_lowercase()));
        return html;
    }

    html.push_str("<table><thead><tr><th>#</th>");
    for spec in columns.iter() {
        html.push_str(&format!("<th>{}</th>", escape(spec.label)));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        let json = serde_json::to_value(row).unwrap_or(Value::Null);
        html.push_str(&format!(
            "<tr><td><a href=\"/{table}/{id}\">{id}</a></td>",
            table = T::TABLE,
            id = row.id()
        ));
        for spec in columns.iter() {
            html.push_str(&format!("<td>{}</td>", cell(spec, json.get(spec.name), references)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

pub fn detail_page<T: Entity>(entity: &T, references: &ReferenceOptions) -> String {
    let json = serde_json::to_value(entity).unwrap_or(Value::Null);
    let mut html = format!("<h1>{}</h1><dl>", escape(&record_title(entity)));
    for spec in T::FIELDS {
        html.push_str(&format!(
            "<dt>{}</dt><dd>{}</dd>",
            escape(spec.label),
            cell(spec, json.get(spec.name), references)
        ));
    }
    if let Some(created) = json.get("created_at") {
        html.push_str(&format!("<dt>Created</dt><dd>{}</dd>", escape(&display_value(created))));
    }
    html.push_str("</dl>");
    html.push_str(&format!(
        "<p><a href=\"/{table}/{id}/edit\">Edit</a> | <a href=\"/{table}\">Back to {plural}</a></p>\
         <form method=\"post\" action=\"/{table}/{id}/delete\">\
         <button type=\"submit\">Delete {singular}</button></form>",
        table = T::TABLE,
        id = entity.id(),
        plural = T::PLURAL.to_lowercase(),
        singular = T::SINGULAR.to_lowercase(),
    ));
    html
}
