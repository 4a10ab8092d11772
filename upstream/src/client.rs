use crate::errors::UpstreamError;
use auth::BearerToken;
use reqwest::StatusCode;
use reqwest::header::{ETAG, IF_MATCH};
use std::fmt;
use std::time::Duration;
use template::RemoteTemplate;

pub const DEFAULT_ENDPOINT: &str = "https://firebaseremoteconfig.googleapis.com";

// External I/O deserves a bound even though the service itself is fast.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Opaque entity tag identifying the fetched template revision. Must be
/// replayed unchanged on publish so the service can detect lost updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Etag(String);

impl Etag {
    pub fn new(raw: impl Into<String>) -> Self {
        Etag(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Etag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client for one project's remote config endpoint.
pub struct ConfigClient {
    http: reqwest::Client,
    url: String,
    project_id: String,
}

impl ConfigClient {
    pub fn new(project_id: impl Into<String>) -> Result<Self, UpstreamError> {
        Self::with_base_url(project_id, DEFAULT_ENDPOINT)
    }

    pub fn with_base_url(
        project_id: impl Into<String>,
        base_url: &str,
    ) -> Result<Self, UpstreamError> {
        let project_id = project_id.into();
        let url = format!(
            "{}/v1/projects/{}/remoteConfig",
            base_url.trim_end_matches('/'),
            project_id
        );
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(ConfigClient {
            http,
            url,
            project_id,
        })
    }

    /// GET the current template, capturing the concurrency token from the
    /// response headers.
    pub async fn fetch(
        &self,
        token: &BearerToken,
    ) -> Result<(RemoteTemplate, Etag), UpstreamError> {
        let response = self
            .http
            .get(&self.url)
            .bearer_auth(token.secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let etag = response
                    .headers()
                    .get(ETAG)
                    .and_then(|value| value.to_str().ok())
                    .map(Etag::new)
                    .ok_or(UpstreamError::MissingEtag)?;
                let template = response.json::<RemoteTemplate>().await?;
                Ok((template, etag))
            }
            StatusCode::NOT_FOUND => Err(UpstreamError::NotFound(self.project_id.clone())),
            status => Err(Self::classify(status, response, true).await),
        }
    }

    /// PUT the merged template. The etag from the preceding fetch rides in
    /// `If-Match`; a stale one means another writer published in between.
    pub async fn publish(
        &self,
        token: &BearerToken,
        template: &RemoteTemplate,
        etag: &Etag,
    ) -> Result<RemoteTemplate, UpstreamError> {
        let response = self
            .http
            .put(&self.url)
            .bearer_auth(token.secret())
            .header(IF_MATCH, etag.as_str())
            .json(template)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<RemoteTemplate>().await?),
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => Err(UpstreamError::Conflict),
            status => Err(Self::classify(status, response, false).await),
        }
    }

    async fn classify(
        status: StatusCode,
        response: reqwest::Response,
        fetching: bool,
    ) -> UpstreamError {
        match status {
            StatusCode::UNAUTHORIZED => UpstreamError::Unauthorized,
            StatusCode::FORBIDDEN => UpstreamError::Forbidden,
            status if status.is_server_error() => UpstreamError::Transient(status.as_u16()),
            status => {
                let body = response.text().await.unwrap_or_default();
                if fetching {
                    UpstreamError::FetchFailed {
                        status: status.as_u16(),
                        body,
                    }
                } else {
                    UpstreamError::PublishFailed {
                        status: status.as_u16(),
                        body,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CONFIG_PATH: &str = "/v1/projects/demo-project/remoteConfig";

    fn client(server: &MockServer) -> ConfigClient {
        ConfigClient::with_base_url("demo-project", &server.uri()).unwrap()
    }

    fn token() -> BearerToken {
        BearerToken::new("ya29.test")
    }

    #[tokio::test]
    async fn fetch_captures_template_and_etag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONFIG_PATH))
            .and(header("authorization", "Bearer ya29.test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("ETag", "etag-demo-project-42")
                    .set_body_json(json!({
                        "parameters": {
                            "greeting": {"defaultValue": {"value": "hi"}, "valueType": "STRING"}
                        },
                        "version": {"versionNumber": "42"}
                    })),
            )
            .mount(&server)
            .await;

        let (template, etag) = client(&server).fetch(&token()).await.unwrap();
        assert_eq!(etag.as_str(), "etag-demo-project-42");
        assert_eq!(template.parameters.len(), 1);
        assert_eq!(
            template.version.unwrap().version_number.as_deref(),
            Some("42")
        );
    }

    #[tokio::test]
    async fn fetch_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONFIG_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server).fetch(&token()).await.unwrap_err();
        match err {
            UpstreamError::NotFound(project) => assert_eq!(project, "demo-project"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn fetch_401_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONFIG_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server).fetch(&token()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Unauthorized));
    }

    #[tokio::test]
    async fn fetch_5xx_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONFIG_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server).fetch(&token()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transient(503)));
    }

    #[tokio::test]
    async fn fetch_without_etag_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONFIG_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let err = client(&server).fetch(&token()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::MissingEtag));
    }

    #[tokio::test]
    async fn publish_sends_if_match_and_parses_the_new_version() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(CONFIG_PATH))
            .and(header("if-match", "etag-demo-project-42"))
            .and(body_partial_json(json!({
                "parameters": {"greeting": {"defaultValue": {"value": "hi"}}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parameters": {
                    "greeting": {"defaultValue": {"value": "hi"}, "valueType": "STRING"}
                },
                "version": {"versionNumber": "43", "updateTime": "2025-06-01T10:00:00Z"}
            })))
            .mount(&server)
            .await;

        let template: RemoteTemplate = serde_json::from_value(json!({
            "parameters": {"greeting": {"defaultValue": {"value": "hi"}}}
        }))
        .unwrap();

        let published = client(&server)
            .publish(&token(), &template, &Etag::new("etag-demo-project-42"))
            .await
            .unwrap();
        assert_eq!(
            published.version.unwrap().version_number.as_deref(),
            Some("43")
        );
    }

    #[tokio::test]
    async fn stale_etag_is_a_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(CONFIG_PATH))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let template: RemoteTemplate = serde_json::from_value(json!({})).unwrap();
        let err = client(&server)
            .publish(&token(), &template, &Etag::new("stale"))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Conflict));
    }

    #[tokio::test]
    async fn precondition_failed_is_also_a_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(CONFIG_PATH))
            .respond_with(ResponseTemplate::new(412))
            .mount(&server)
            .await;

        let template: RemoteTemplate = serde_json::from_value(json!({})).unwrap();
        let err = client(&server)
            .publish(&token(), &template, &Etag::new("stale"))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Conflict));
    }

    #[tokio::test]
    async fn publish_validation_failure_carries_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(CONFIG_PATH))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error": {"message": "VALIDATION_ERROR"}}"#),
            )
            .mount(&server)
            .await;

        let template: RemoteTemplate = serde_json::from_value(json!({})).unwrap();
        let err = client(&server)
            .publish(&token(), &template, &Etag::new("etag"))
            .await
            .unwrap_err();
        match err {
            UpstreamError::PublishFailed { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("VALIDATION_ERROR"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
