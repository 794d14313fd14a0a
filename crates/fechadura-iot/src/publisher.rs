// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTPS publisher for the AWS IoT data-plane `POST /topics/{topic}` API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, warn};

use fechadura_core::{Credentials, FechaduraError, PublishRequest, Publisher};

use crate::sigv4::{self, Signer, SigningInput};

/// Service name used in the credential scope.
pub const SERVICE: &str = "iotdata";

/// Publishes commands to an IoT data endpoint, signing each request with the
/// unlocked credentials.
#[derive(Debug, Clone)]
pub struct IotDataPublisher {
    client: reqwest::Client,
    base_url: String,
    host: String,
    region: String,
}

impl IotDataPublisher {
    /// Creates a publisher for `endpoint`.
    ///
    /// A bare host gets an `https://` scheme; an endpoint that already names
    /// a scheme is used as given.
    pub fn new(
        endpoint: &str,
        region: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FechaduraError> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        let base_url = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{endpoint}")
        };

        let parsed = Url::parse(&base_url)
            .map_err(|e| FechaduraError::Config(format!("invalid endpoint `{endpoint}`: {e}")))?;
        let host = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(FechaduraError::Config(format!(
                    "endpoint `{endpoint}` has no host"
                )));
            }
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FechaduraError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url,
            host,
            region: region.into(),
        })
    }

    /// The `Host` value that requests are signed for.
    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Request path for `topic`; slashes inside the topic are escaped.
pub fn topic_path(topic: &str) -> String {
    format!("/topics/{}", sigv4::uri_encode(topic, true))
}

#[async_trait]
impl Publisher for IotDataPublisher {
    async fn publish(
        &self,
        credentials: &Credentials,
        request: &PublishRequest,
    ) -> Result<(), FechaduraError> {
        let path = topic_path(&request.topic);
        let query = format!("qos={}", request.qos);
        let canonical_uri = sigv4::uri_encode(&path, false);

        let signer = Signer::new(
            credentials.identifier(),
            credentials.secret(),
            &self.region,
            SERVICE,
        );
        let signed = signer.sign(
            &SigningInput {
                method: "POST",
                host: &self.host,
                canonical_uri: &canonical_uri,
                canonical_query: &query,
                payload: &request.payload,
            },
            Utc::now(),
        )?;

        let url = format!("{}{path}?{query}", self.base_url);
        debug!(topic = %request.topic, qos = request.qos, "publishing command");

        let response = self
            .client
            .post(&url)
            .header("x-amz-date", &signed.amz_date)
            .header(AUTHORIZATION, &signed.authorization)
            .body(request.payload.clone())
            .send()
            .await
            .map_err(|e| FechaduraError::Transport {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(status = %status, "command accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "publish rejected");
        let message = if body.trim().is_empty() {
            status.to_string()
        } else {
            format!("{status}: {}", body.trim())
        };
        Err(FechaduraError::Transport {
            message,
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Credentials {
        Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
    }

    fn publisher(uri: &str) -> IotDataPublisher {
        IotDataPublisher::new(uri, "us-east-1", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn bare_host_gets_https_scheme() {
        let p = IotDataPublisher::new(
            "abc-ats.iot.us-east-1.amazonaws.com",
            "us-east-1",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(p.base_url, "https://abc-ats.iot.us-east-1.amazonaws.com");
        assert_eq!(p.host(), "abc-ats.iot.us-east-1.amazonaws.com");
    }

    #[test]
    fn explicit_scheme_and_port_are_kept() {
        let p = publisher("http://127.0.0.1:8443/");
        assert_eq!(p.base_url, "http://127.0.0.1:8443");
        assert_eq!(p.host(), "127.0.0.1:8443");
    }

    #[test]
    fn invalid_endpoint_is_config_error() {
        let err = IotDataPublisher::new("http://", "us-east-1", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, FechaduraError::Config(_)));
    }

    #[test]
    fn topic_slashes_are_escaped() {
        assert_eq!(topic_path("door"), "/topics/door");
        assert_eq!(topic_path("fechadura/command"), "/topics/fechadura%2Fcommand");
    }

    #[tokio::test]
    async fn publish_sends_signed_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/topics/door"))
            .and(query_param("qos", "1"))
            .and(header_exists("authorization"))
            .and(header_exists("x-amz-date"))
            .and(body_string("{}"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        publisher(&server.uri())
            .publish(&credentials(), &PublishRequest::new("door", 1))
            .await
            .unwrap();

        let received = server.received_requests().await.unwrap();
        let authorization = received[0]
            .headers
            .get("authorization")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
        assert!(authorization.contains("/us-east-1/iotdata/aws4_request"));
        assert!(authorization.contains("SignedHeaders=host;x-amz-date"));
        assert!(!authorization.contains("wJalrXUtnFEMI"));
    }

    #[tokio::test]
    async fn custom_payload_is_sent_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/topics/door"))
            .and(query_param("qos", "0"))
            .and(body_string("{\"open\":true}"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let request = PublishRequest::new("door", 0).with_payload("{\"open\":true}");
        publisher(&server.uri())
            .publish(&credentials(), &request)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_publish_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("{\"message\":\"denied\"}"))
            .mount(&server)
            .await;

        let err = publisher(&server.uri())
            .publish(&credentials(), &PublishRequest::new("door", 0))
            .await
            .unwrap_err();
        match err {
            FechaduraError::Transport { message, .. } => {
                assert_eq!(message, "403 Forbidden: {\"message\":\"denied\"}");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_error_body_reports_status_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = publisher(&server.uri())
            .publish(&credentials(), &PublishRequest::new("door", 0))
            .await
            .unwrap_err();
        assert_eq!(err.detail(), "503 Service Unavailable");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let err = publisher(&uri)
            .publish(&credentials(), &PublishRequest::new("door", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, FechaduraError::Transport { .. }));
    }
}
