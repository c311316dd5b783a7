//! Server-rendered HTML. Every interpolated value goes through [`escape`].

pub mod forms;
pub mod pages;
pub mod records;

use crate::auth::Flash;
use crate::middleware::CurrentUser;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const NAV: &[(&str, &str)] = &[
    ("/dashboard", "Dashboard"),
    ("/properties", "Properties"),
    ("/tenants", "Tenants"),
    ("/contracts", "Contracts"),
    ("/cheques", "Cheques"),
];

/// Wraps `body` (already escaped) in the page chrome.
pub fn layout(title: &str, user: Option<&CurrentUser>, flashes: &[Flash], body: &str) -> String {
    let mut nav = String::new();
    if let Some(user) = user {
        nav.push_str("<nav>");
        for (href, label) in NAV {
            nav.push_str(&format!("<a href=\"{}\">{}</a> ", href, label));
        }
        nav.push_str(&format!(
            "<span class=\"user\">{}</span> \
             <form method=\"post\" action=\"/logout\" class=\"inline\"><button>Logout</button></form>",
            escape(&user.email)
        ));
        nav.push_str("</nav>");
    }

    let notices: String = flashes
        .iter()
        .map(|f| format!("<p class=\"flash flash-{}\">{}</p>", f.level.as_str(), escape(&f.message)))
        .collect();

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} | Property Manager</title>\n<style>{css}</style>\n</head>\n<body>\n\
         {nav}\n<main>\n{notices}\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
        css = STYLE,
        nav = nav,
        notices = notices,
        body = body,
    )
}

pub fn error_page(status: u16, message: &str) -> String {
    layout(
        "Error",
        None,
        &[],
        &format!(
            "<h1>{}</h1><p>{}</p><p><a href=\"/\">Back to start</a></p>",
            status,
            escape(message)
        ),
    )
}

const STYLE: &str = "body{font-family:sans-serif;margin:0 auto;max-width:960px;padding:1rem}\
nav a{margin-right:.5rem}.inline{display:inline}\
table{border-collapse:collapse;width:100%}td,th{border-bottom:1px solid #ddd;padding:.3rem;text-align:left}\
.flash{padding:.5rem}.flash-warning{background:#fde2e1}.flash-success{background:#e1f5e4}.flash-info{background:#e4ecfa}\
.error{color:#b00}label{display:block;margin-top:.5rem}";
