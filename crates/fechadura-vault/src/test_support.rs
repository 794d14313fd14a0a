// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal in-crate fakes for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fechadura_core::{
    Capability, Credentials, FechaduraError, KeyValueStore, Notice, Notifier, PasswordPrompt,
    PromptInfo, PublishRequest, Publisher,
};
use secrecy::SecretString;

use crate::keystore::PresenceCheck;

#[derive(Default)]
pub(crate) struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<String>, FechaduraError> {
        Ok(self.values.lock().unwrap().get(name).cloned())
    }

    async fn put(&self, name: &str, value: &str) -> Result<(), FechaduraError> {
        self.values
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), FechaduraError> {
        self.values.lock().unwrap().remove(name);
        Ok(())
    }
}

pub(crate) struct ScriptedCheck {
    denial: Option<String>,
}

impl ScriptedCheck {
    pub(crate) fn approving() -> Self {
        Self { denial: None }
    }

    pub(crate) fn denying(reason: &str) -> Self {
        Self {
            denial: Some(reason.to_string()),
        }
    }
}

#[async_trait]
impl PresenceCheck for ScriptedCheck {
    fn capability(&self) -> Capability {
        Capability::Available
    }

    async fn confirm(&self, _prompt: &PromptInfo) -> Result<(), FechaduraError> {
        match &self.denial {
            None => Ok(()),
            Some(reason) => Err(FechaduraError::BiometricDenied(reason.clone())),
        }
    }
}

pub(crate) struct FixedPassword(pub(crate) &'static str);

#[async_trait]
impl PasswordPrompt for FixedPassword {
    async fn request_password(&self) -> Result<Option<SecretString>, FechaduraError> {
        Ok(Some(SecretString::from(self.0)))
    }
}

pub(crate) struct AcceptingPublisher;

#[async_trait]
impl Publisher for AcceptingPublisher {
    async fn publish(
        &self,
        _credentials: &Credentials,
        _request: &PublishRequest,
    ) -> Result<(), FechaduraError> {
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct VecNotifier(pub(crate) Mutex<Vec<Notice>>);

impl Notifier for VecNotifier {
    fn notify(&self, notice: Notice) {
        self.0.lock().unwrap().push(notice);
    }
}
