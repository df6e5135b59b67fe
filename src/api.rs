use anyhow::{bail, Context, Result};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::StatusCode;
use tracing::{info, warn};

pub const BASE_URL: &str = "https://country-leaders.onrender.com";

/// Validity of the current cookie. The API gives no expiry metadata, so a
/// session only turns `Suspect` after a 401/403 has been observed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Valid,
    Suspect,
}

/// Opaque cookie set issued by `/cookie`. Replaced wholesale on renewal,
/// never merged.
#[derive(Debug, Clone)]
pub struct Session {
    cookie: String,
    state: SessionState,
}

impl Session {
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Record an observed auth failure. The only way back to `Valid` is a
    /// fresh session from [`ApiClient::acquire_session`].
    pub fn mark_suspect(&mut self) {
        self.state = SessionState::Suspect;
    }

    fn header_value(&self) -> &str {
        &self.cookie
    }
}

/// Client for the country-leaders API. One underlying connection pool for
/// the whole run.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Reachability probe against `/status`. Informational only, never fatal.
    pub async fn check_status(&self) {
        match self.http.get(format!("{}/status", self.base_url)).send().await {
            Ok(resp) if resp.status().is_success() => info!("Server is up and running"),
            Ok(resp) => warn!("Server returned status {}", resp.status()),
            Err(e) => warn!("Status probe failed: {}", e),
        }
    }

    /// Fetch a fresh cookie from `/cookie`. No retry: if the issuing endpoint
    /// is unreachable the run cannot proceed at all.
    pub async fn acquire_session(&self) -> Result<Session> {
        let resp = self
            .http
            .get(format!("{}/cookie", self.base_url))
            .send()
            .await
            .context("Failed to reach the cookie endpoint")?;

        // Keep only the name=value pairs; attributes like Path or Expires
        // don't belong in a Cookie request header.
        let cookie = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join("; ");

        if cookie.is_empty() {
            bail!("Cookie endpoint returned no Set-Cookie header");
        }

        Ok(Session {
            cookie,
            state: SessionState::Valid,
        })
    }

    /// List the countries to scrape. Fatal on any non-success: without the
    /// country list there is nothing to iterate, so no renewal is attempted
    /// at this call site.
    pub async fn countries(&self, session: &Session) -> Result<Vec<String>> {
        let resp = self
            .http
            .get(format!("{}/countries", self.base_url))
            .header(COOKIE, session.header_value())
            .send()
            .await
            .context("Failed to reach the countries endpoint")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("Countries endpoint returned {}", status);
        }

        resp.json::<Vec<String>>()
            .await
            .context("Countries response was not a JSON list of strings")
    }

    /// Request the leader list for one country. Returns status and raw body;
    /// the fetch loop owns the 401/403 renewal policy and the parsing.
    pub async fn leaders(&self, country: &str, session: &Session) -> Result<(StatusCode, String)> {
        let resp = self
            .http
            .get(format!("{}/leaders", self.base_url))
            .query(&[("country", country)])
            .header(COOKIE, session.header_value())
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        Ok((status, body))
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn acquire_session_joins_all_cookies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cookie"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("set-cookie", "token=abc; Path=/; HttpOnly")
                    .append_header("set-cookie", "trace=xyz"),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let session = api.acquire_session().await.unwrap();
        assert_eq!(session.header_value(), "token=abc; trace=xyz");
        assert_eq!(session.state(), SessionState::Valid);
    }

    #[tokio::test]
    async fn acquire_session_without_cookie_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cookie"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        assert!(api.acquire_session().await.is_err());
    }

    #[tokio::test]
    async fn countries_sends_cookie_and_parses_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cookie"))
            .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "token=abc"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/countries"))
            .and(header("cookie", "token=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["us", "fr"])))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let session = api.acquire_session().await.unwrap();
        let countries = api.countries(&session).await.unwrap();
        assert_eq!(countries, vec!["us", "fr"]);
    }

    #[tokio::test]
    async fn countries_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cookie"))
            .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "token=abc"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/countries"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let session = api.acquire_session().await.unwrap();
        assert!(api.countries(&session).await.is_err());
    }

    #[tokio::test]
    async fn leaders_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/leaders"))
            .and(query_param("country", "us"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let session = Session {
            cookie: "token=stale".into(),
            state: SessionState::Valid,
        };
        let (status, body) = api.leaders("us", &session).await.unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "expired");
    }
}
