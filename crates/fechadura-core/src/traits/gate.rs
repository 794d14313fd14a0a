// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Biometric gate: the external authentication step in front of the wrapping key.

use async_trait::async_trait;

use crate::error::FechaduraError;
use crate::traits::keystore::CipherHandle;
use crate::types::{Capability, PromptInfo};

/// Asks the user to authenticate and, on success, authorizes a cipher handle.
///
/// `authenticate` resolves exactly once: `Ok` with the now-usable handle, or
/// `Err(FechaduraError::BiometricDenied)` on failure or cancellation. The
/// handle is dropped on failure.
#[async_trait]
pub trait BiometricGate: Send + Sync {
    /// Whether the device has usable biometric hardware and enrollment.
    fn capability(&self) -> Capability;

    /// Prompt the user and authorize `cipher` on success.
    async fn authenticate(
        &self,
        prompt: &PromptInfo,
        cipher: Box<dyn CipherHandle>,
    ) -> Result<Box<dyn CipherHandle>, FechaduraError>;
}
