// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Fechadura lock client.
//!
//! This crate provides the error taxonomy, the collaborator traits the unlock
//! flow is written against, and the value types shared across the workspace,
//! including the canonical [`EncryptedBlob`] text form.

pub mod blob;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use blob::{EncryptedBlob, IV_LEN, TAG_LEN};
pub use error::FechaduraError;
pub use types::{Capability, Credentials, Notice, PromptInfo, PublishRequest};

// Re-export all collaborator traits at crate root.
pub use traits::{
    BiometricGate, CipherHandle, CipherMode, GrantId, KeyAlias, KeySpec, KeyValueStore, Notifier,
    PasswordPrompt, Publisher, SecureKeyProvider,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fechadura_error_has_all_variants() {
        let _config = FechaduraError::Config("test".into());
        let _format = FechaduraError::Format("test".into());
        let _auth = FechaduraError::AuthenticationFailure;
        let _denied = FechaduraError::BiometricDenied("cancelled".into());
        let _integrity = FechaduraError::Integrity("test".into());
        let _transport = FechaduraError::Transport {
            message: "test".into(),
            source: None,
        };
        let _keystore = FechaduraError::KeyStore("test".into());
        let _gated = FechaduraError::UserNotAuthenticated("wrap".into());
        let _storage = FechaduraError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _internal = FechaduraError::Internal("test".into());
    }

    #[test]
    fn transport_detail_is_bare_message() {
        let err = FechaduraError::Transport {
            message: "403 Forbidden".into(),
            source: None,
        };
        assert_eq!(err.detail(), "403 Forbidden");
    }

    #[test]
    fn error_notice_uses_template() {
        let notice = Notice::Error("connection refused".into());
        assert_eq!(notice.to_string(), "Error: connection refused");
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = Credentials::new("AKIAEXAMPLE", "secretkeyvalue");
        let debug = format!("{creds:?}");
        assert!(debug.contains("AKIAEXAMPLE"));
        assert!(!debug.contains("secretkeyvalue"));
    }

    #[test]
    fn publish_request_defaults_to_empty_object() {
        let request = PublishRequest::new("door/command", 1);
        assert_eq!(request.payload, b"{}");
        let request = request.with_payload("{\"open\":true}");
        assert_eq!(request.payload, b"{\"open\":true}");
    }

    #[test]
    fn capability_display_and_parse() {
        use std::str::FromStr;

        let variants = [
            Capability::Available,
            Capability::NoHardware,
            Capability::NoneEnrolled,
            Capability::Unavailable,
        ];
        for variant in &variants {
            let parsed = Capability::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
        assert_eq!(Capability::NoneEnrolled.to_string(), "none_enrolled");
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_provider<T: SecureKeyProvider>() {}
        fn _assert_gate<T: BiometricGate>() {}
        fn _assert_store<T: KeyValueStore>() {}
        fn _assert_publisher<T: Publisher>() {}
        fn _assert_notifier<T: Notifier>() {}
        fn _assert_prompt<T: PasswordPrompt>() {}
    }
}
