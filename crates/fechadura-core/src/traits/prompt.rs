// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password entry collaborator.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::FechaduraError;

/// Collects the unlock password from the user.
#[async_trait]
pub trait PasswordPrompt: Send + Sync {
    /// `Ok(None)` means the user dismissed the dialog.
    async fn request_password(&self) -> Result<Option<SecretString>, FechaduraError>;
}
