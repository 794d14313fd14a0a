// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publisher trait for delivering the command to the device-control endpoint.

use async_trait::async_trait;

use crate::error::FechaduraError;
use crate::types::{Credentials, PublishRequest};

/// Sends one command authorized by the unlocked credentials.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `request`; failures are [`FechaduraError::Transport`].
    async fn publish(
        &self,
        credentials: &Credentials,
        request: &PublishRequest,
    ) -> Result<(), FechaduraError>;
}
