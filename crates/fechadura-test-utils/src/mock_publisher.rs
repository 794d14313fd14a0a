// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock publisher for deterministic testing.
//!
//! `MockPublisher` implements `Publisher` by capturing every publish call
//! for assertion in tests, optionally failing with a transport error.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tokio::sync::Mutex;

use fechadura_core::{Credentials, FechaduraError, PublishRequest, Publisher};

/// One captured publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedCommand {
    pub identifier: String,
    pub secret: String,
    pub request: PublishRequest,
}

/// A mock publisher for testing.
///
/// Every call to `publish()` is captured and retrievable via `published()`,
/// including calls that are then failed.
pub struct MockPublisher {
    published: Arc<Mutex<Vec<PublishedCommand>>>,
    failure: Option<String>,
}

impl MockPublisher {
    /// Create a mock publisher that accepts every command.
    pub fn new() -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    /// Create a mock publisher that rejects every command with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
            failure: Some(message.into()),
        }
    }

    /// Get all commands passed to `publish()`.
    pub async fn published(&self) -> Vec<PublishedCommand> {
        self.published.lock().await.clone()
    }

    /// Get the count of publish calls.
    pub async fn publish_count(&self) -> usize {
        self.published.lock().await.len()
    }
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(
        &self,
        credentials: &Credentials,
        request: &PublishRequest,
    ) -> Result<(), FechaduraError> {
        self.published.lock().await.push(PublishedCommand {
            identifier: credentials.identifier().to_string(),
            secret: credentials.secret().expose_secret().to_string(),
            request: request.clone(),
        });

        match &self.failure {
            None => Ok(()),
            Some(message) => Err(FechaduraError::Transport {
                message: message.clone(),
                source: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_is_captured() {
        let publisher = MockPublisher::new();
        let credentials = Credentials::new("AKIAEXAMPLE", "secret");
        let request = PublishRequest::new("door", 1);

        publisher.publish(&credentials, &request).await.unwrap();

        let published = publisher.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].identifier, "AKIAEXAMPLE");
        assert_eq!(published[0].secret, "secret");
        assert_eq!(published[0].request.payload, b"{}");
    }

    #[tokio::test]
    async fn failing_publisher_returns_transport_error() {
        let publisher = MockPublisher::failing("network unreachable");
        let result = publisher
            .publish(&Credentials::new("id", "s"), &PublishRequest::new("door", 0))
            .await;

        assert!(matches!(
            result,
            Err(FechaduraError::Transport { ref message, .. }) if message == "network unreachable"
        ));
        assert_eq!(publisher.publish_count().await, 1);
    }
}
