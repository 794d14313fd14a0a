// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password acquisition via TTY prompt or FECHADURA_PASSWORD environment variable.

use async_trait::async_trait;
use fechadura_core::{FechaduraError, PasswordPrompt};
use secrecy::SecretString;
use zeroize::Zeroizing;

/// The environment variable name for providing the unlock password.
pub const PASSWORD_ENV_VAR: &str = "FECHADURA_PASSWORD";

fn password_from_env() -> Option<SecretString> {
    match std::env::var(PASSWORD_ENV_VAR) {
        Ok(password) if !password.is_empty() => Some(SecretString::from(password)),
        _ => None,
    }
}

fn stdin_is_terminal() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdin())
}

fn no_password_error() -> FechaduraError {
    FechaduraError::Config(format!(
        "No password provided. Set {PASSWORD_ENV_VAR} environment variable or run interactively."
    ))
}

/// Read one line without echo.
pub fn read_hidden(label: &str) -> Result<Zeroizing<String>, FechaduraError> {
    eprint!("{label}");
    rpassword::read_password().map(Zeroizing::new).map_err(|e| {
        let what = label.trim_end_matches([':', ' ']).to_lowercase();
        FechaduraError::Internal(format!("failed to read {what}: {e}"))
    })
}

/// Get the password from the environment variable or an interactive TTY prompt.
///
/// Priority:
/// 1. `FECHADURA_PASSWORD` environment variable (for scripted use)
/// 2. Interactive TTY prompt via `rpassword` (for human operators)
///
/// Returns an error if neither source is available.
pub fn get_password() -> Result<SecretString, FechaduraError> {
    if let Some(password) = password_from_env() {
        return Ok(password);
    }

    if stdin_is_terminal() {
        let password = read_hidden("Password: ")?;
        if password.is_empty() {
            return Err(FechaduraError::Config("empty password not allowed".to_string()));
        }
        return Ok(SecretString::from(password.to_string()));
    }

    Err(no_password_error())
}

/// Get a new password with confirmation prompt (for encrypting credentials).
///
/// Prompts twice and verifies the passwords match. The environment variable
/// needs no confirmation.
pub fn get_password_with_confirm() -> Result<SecretString, FechaduraError> {
    if let Some(password) = password_from_env() {
        return Ok(password);
    }

    if stdin_is_terminal() {
        let pass1 = read_hidden("New password: ")?;
        let pass2 = read_hidden("Confirm password: ")?;

        if pass1 != pass2 {
            return Err(FechaduraError::Config("passwords do not match".to_string()));
        }
        if pass1.is_empty() {
            return Err(FechaduraError::Config("empty password not allowed".to_string()));
        }
        return Ok(SecretString::from(pass1.to_string()));
    }

    Err(no_password_error())
}

/// [`PasswordPrompt`] for the terminal. An empty entry dismisses the dialog.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPasswordPrompt;

#[async_trait]
impl PasswordPrompt for TerminalPasswordPrompt {
    async fn request_password(&self) -> Result<Option<SecretString>, FechaduraError> {
        if let Some(password) = password_from_env() {
            return Ok(Some(password));
        }
        if !stdin_is_terminal() {
            return Err(no_password_error());
        }

        let entered = tokio::task::spawn_blocking(|| read_hidden("Password: "))
            .await
            .map_err(|e| FechaduraError::Internal(format!("password prompt task failed: {e}")))??;

        if entered.is_empty() {
            Ok(None)
        } else {
            Ok(Some(SecretString::from(entered.to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    #[serial]
    fn get_password_from_env_var() {
        // SAFETY: test-only env mutation. Tests using env vars must not run in parallel.
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "test-password") };
        let result = get_password();
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "test-password");
    }

    #[test]
    #[serial]
    fn get_password_with_confirm_from_env_var() {
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "test-password") };
        let result = get_password_with_confirm();
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

        assert!(result.is_ok());
    }

    #[test]
    #[serial]
    fn empty_env_var_is_rejected() {
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "") };
        // In CI/test, stdin is not a terminal, so this will fail.
        let result = get_password();
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

        assert!(result.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn terminal_prompt_prefers_env_var() {
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "from-env") };
        let result = TerminalPasswordPrompt.request_password().await;
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

        let password = result.unwrap().expect("password should be present");
        assert_eq!(password.expose_secret(), "from-env");
    }
}
