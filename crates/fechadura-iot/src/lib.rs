// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publisher adapter that delivers unlock commands to an AWS IoT data-plane
//! endpoint, signed with the unlocked credentials.

pub mod publisher;
pub mod sigv4;

pub use publisher::IotDataPublisher;
