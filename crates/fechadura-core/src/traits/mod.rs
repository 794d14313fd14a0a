// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions for the unlock flow.
//!
//! Every external concern (secure key storage, the biometric gate, persisted
//! preferences, the publisher, notifications, password entry) sits behind one
//! of these traits. Async seams use `#[async_trait]` for dynamic dispatch.

pub mod gate;
pub mod keystore;
pub mod notifier;
pub mod prompt;
pub mod publisher;
pub mod store;

// Re-export all traits at the traits module level for convenience.
pub use gate::BiometricGate;
pub use keystore::{CipherHandle, CipherMode, GrantId, KeyAlias, KeySpec, SecureKeyProvider};
pub use notifier::Notifier;
pub use prompt::PasswordPrompt;
pub use publisher::Publisher;
pub use store::KeyValueStore;
