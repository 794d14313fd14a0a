// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal implementations of the notifier and the presence check.

use std::io::{BufRead, IsTerminal, Write};

use async_trait::async_trait;
use fechadura_core::{Capability, FechaduraError, Notice, Notifier, PromptInfo};
use fechadura_vault::PresenceCheck;

/// Prints notices to stdout.
pub struct ConsoleNotifier {
    use_color: bool,
}

impl ConsoleNotifier {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        println!("{}", render_notice(&notice, self.use_color));
    }
}

/// One-line rendering of `notice`.
pub fn render_notice(notice: &Notice, use_color: bool) -> String {
    let text = notice.to_string();
    if !use_color {
        return text;
    }

    use colored::Colorize;
    match notice {
        Notice::Success => text.green().to_string(),
        Notice::WrongPassword | Notice::Error(_) => text.red().to_string(),
        Notice::DeviceUnsupported => text.yellow().to_string(),
        Notice::Sending => text.dimmed().to_string(),
    }
}

/// Presence check that asks for an explicit confirmation on the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePresence;

#[async_trait]
impl PresenceCheck for ConsolePresence {
    fn capability(&self) -> Capability {
        if std::io::stdin().is_terminal() {
            Capability::Available
        } else {
            Capability::Unavailable
        }
    }

    async fn confirm(&self, prompt: &PromptInfo) -> Result<(), FechaduraError> {
        if !std::io::stdin().is_terminal() {
            return Err(FechaduraError::BiometricDenied(
                "no interactive terminal".to_string(),
            ));
        }

        let label = format!(
            "{} [y/N, n = {}]: ",
            prompt.title, prompt.negative_button
        );
        let answer = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
            eprint!("{label}");
            std::io::stderr().flush()?;
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| FechaduraError::Internal(format!("presence prompt task failed: {e}")))?
        .map_err(|e| FechaduraError::BiometricDenied(format!("failed to read answer: {e}")))?;

        if is_confirmation(&answer) {
            Ok(())
        } else {
            Err(FechaduraError::BiometricDenied(prompt.negative_button.clone()))
        }
    }
}

fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
