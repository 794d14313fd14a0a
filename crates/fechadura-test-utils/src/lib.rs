// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Fechadura integration tests.
//!
//! Provides scripted collaborators and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a terminal, a network, or
//! biometric hardware.
//!
//! # Components
//!
//! - [`MockPublisher`] - Publisher capturing every command, optionally failing
//! - [`ScriptedPresence`] - Presence check answering from a queue
//! - [`ScriptedPasswordPrompt`] - Password dialog answering from a queue
//! - [`RecordingNotifier`] - Notifier capturing notices in order
//! - [`MemoryStore`] - In-memory key-value store
//! - [`TestHarness`] - All of the above wired into an unlock stack

pub mod harness;
pub mod mock_publisher;
pub mod scripted;

pub use harness::{seal_credentials, TestHarness, RECORD_NAME, WRAPPING_KEY_NAME};
pub use mock_publisher::{MockPublisher, PublishedCommand};
pub use scripted::{MemoryStore, RecordingNotifier, ScriptedPasswordPrompt, ScriptedPresence};
