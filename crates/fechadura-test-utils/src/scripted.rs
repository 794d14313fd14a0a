// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted user-interaction fakes: store, presence check, password dialog,
//! and notification sink.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::Mutex;

use fechadura_core::{
    Capability, FechaduraError, KeyValueStore, Notice, Notifier, PasswordPrompt, PromptInfo,
};
use fechadura_vault::PresenceCheck;

/// In-memory `KeyValueStore`. Writes can be made to fail.
#[derive(Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current value under `name`.
    pub async fn value(&self, name: &str) -> Option<String> {
        self.values.lock().await.get(name).cloned()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.values.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.lock().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<String>, FechaduraError> {
        Ok(self.values.lock().await.get(name).cloned())
    }

    async fn put(&self, name: &str, value: &str) -> Result<(), FechaduraError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FechaduraError::Storage {
                source: "store is read-only".into(),
            });
        }
        self.values
            .lock()
            .await
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), FechaduraError> {
        self.values.lock().await.remove(name);
        Ok(())
    }
}

/// `PresenceCheck` answering from a queue of scripted outcomes.
///
/// When the queue runs dry every confirmation succeeds.
pub struct ScriptedPresence {
    capability: Capability,
    outcomes: std::sync::Mutex<VecDeque<Result<(), String>>>,
    prompts: std::sync::Mutex<Vec<PromptInfo>>,
}

impl ScriptedPresence {
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            outcomes: std::sync::Mutex::new(VecDeque::new()),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful confirmation.
    pub fn approve(&self) {
        self.push(Ok(()));
    }

    /// Queue a failed confirmation with the platform's error text.
    pub fn deny(&self, reason: impl Into<String>) {
        self.push(Err(reason.into()));
    }

    /// Prompts shown so far.
    pub fn prompts(&self) -> Vec<PromptInfo> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn push(&self, outcome: Result<(), String>) {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
    }
}

impl Default for ScriptedPresence {
    fn default() -> Self {
        Self::new(Capability::Available)
    }
}

#[async_trait]
impl PresenceCheck for ScriptedPresence {
    fn capability(&self) -> Capability {
        self.capability
    }

    async fn confirm(&self, prompt: &PromptInfo) -> Result<(), FechaduraError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.clone());
        let outcome = self
            .outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Ok(()));
        outcome.map_err(FechaduraError::BiometricDenied)
    }
}

/// `PasswordPrompt` answering from a queue; `None` entries are cancellations.
///
/// When the queue runs dry the dialog is cancelled.
#[derive(Default)]
pub struct ScriptedPasswordPrompt {
    answers: Mutex<VecDeque<Option<String>>>,
    requests: AtomicUsize,
}

impl ScriptedPasswordPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enter(&self, password: impl Into<String>) {
        self.answers.lock().await.push_back(Some(password.into()));
    }

    pub async fn cancel(&self) {
        self.answers.lock().await.push_back(None);
    }

    /// How many times the dialog was shown.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PasswordPrompt for ScriptedPasswordPrompt {
    async fn request_password(&self) -> Result<Option<SecretString>, FechaduraError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let answer = self.answers.lock().await.pop_front().flatten();
        Ok(answer.map(SecretString::from))
    }
}

/// `Notifier` that records every notice in order.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: std::sync::Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Rendered notice texts.
    pub fn messages(&self) -> Vec<String> {
        self.notices().iter().map(ToString::to_string).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!(%notice, "notice recorded");
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notice);
    }
}
