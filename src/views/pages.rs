use super::escape;
use super::records::record_title;
use crate::database::models::Property;

pub fn home() -> String {
    "<h1>Welcome to Property Manager</h1><p><a href=\"/login\">Login</a></p>".to_string()
}

pub fn login(email: &str, next: Option<&str>) -> String {
    let next_input = next
        .map(|n| format!("<input type=\"hidden\" name=\"next\" value=\"{}\">", escape(n)))
        .unwrap_or_default();
    format!(
        "<h1>Login</h1>\
         <form method=\"post\" action=\"/login\">{next_input}\
         <label for=\"email\">Email</label>\
         <input type=\"email\" id=\"email\" name=\"email\" value=\"{}\" required autofocus>\
         <label for=\"password\">Password</label>\
         <input type=\"password\" id=\"password\" name=\"password\" required>\
         <p><button type=\"submit\">Login</button></p></form>",
        escape(email)
    )
}

/// Row counts shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub properties: i64,
    pub vacant: i64,
    pub occupied: i64,
    pub tenants: i64,
    pub contracts: i64,
    pub cheques: i64,
}

pub fn dashboard(stats: &DashboardStats, recent: &[Property]) -> String {
    let mut html = format!(
        "<h1>Dashboard</h1><ul>\
         <li><a href=\"/properties\">Total properties</a>: {}</li>\
         <li><a href=\"/properties?status=vacant\">Vacant</a>: {}</li>\
         <li><a href=\"/properties?status=occupied\">Occupied</a>: {}</li>\
         <li><a href=\"/tenants\">Tenants</a>: {}</li>\
         <li><a href=\"/contracts\">Contracts</a>: {}</li>\
         <li><a href=\"/cheques\">Cheques</a>: {}</li></ul>",
        stats.properties, stats.vacant, stats.occupied, stats.tenants, stats.contracts, stats.cheques
    );
    if !recent.is_empty() {
        html.push_str("<h2>Newest properties</h2><ul>");
        for property in recent {
            html.push_str(&format!(
                "<li><a href=\"/properties/{}\">{}</a> ({})</li>",
                property.id,
                escape(&record_title(property)),
                property.status.as_str()
            ));
        }
        html.push_str("</ul>");
    }
    html
}
