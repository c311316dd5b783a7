#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{header, redirect, Client, Response, StatusCode};

use property_manager::config::AppConfig;
use property_manager::{app, bootstrap};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// In-process server on an ephemeral port, backed by its own in-memory database
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let (state, _) = bootstrap(AppConfig::for_tests()).await.context("bootstrap failed")?;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        // Redirects are asserted on, never followed
        let client = Client::builder().redirect(redirect::Policy::none()).build()?;
        Ok(Self {
            base_url: format!("http://{}", addr),
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, session: Option<&str>) -> Result<Response> {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = session {
            request = request.header(header::COOKIE, format!("pm_session={}", token));
        }
        Ok(request.send().await?)
    }

    pub async fn post_form(&self, path: &str, session: Option<&str>, form: &[(&str, &str)]) -> Result<Response> {
        let mut request = self.client.post(self.url(path)).form(form);
        if let Some(token) = session {
            request = request.header(header::COOKIE, format!("pm_session={}", token));
        }
        Ok(request.send().await?)
    }

    /// Logs in and returns the authenticated session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .post_form("/login", None, &[("email", email), ("password", password)])
            .await?;
        anyhow::ensure!(res.status() == StatusCode::SEE_OTHER, "login failed: {}", res.status());
        session_from(&res).context("login response set no session cookie")
    }

    pub async fn login_admin(&self) -> Result<String> {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }
}

/// The `pm_session` value set by a response, if any.
pub fn session_from(res: &Response) -> Option<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == "pm_session")
        .map(|(_, value)| value.to_string())
}

pub fn location(res: &Response) -> Option<String> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Id at the end of a `/table/{id}` redirect.
pub fn created_id(res: &Response) -> Option<i64> {
    location(res)?.rsplit('/').next()?.parse().ok()
}
