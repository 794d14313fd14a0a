// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing notification sink.

use crate::types::Notice;

/// Fire-and-forget status messages. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
