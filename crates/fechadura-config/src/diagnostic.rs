// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics rendered through miette.
//!
//! Parse failures from Figment and the semantic checks in
//! [`validation`](crate::validation) both end up here as [`ConfigError`]s.
//! Errors about a specific setting point at its value in the TOML file that
//! set it, so a bad credential blob or QoS level is shown in place.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key no section of `fechadura.toml` accepts.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(fechadura::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest valid key, if any is close enough.
        suggestion: Option<String>,
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type, e.g. a string for `device.qos`.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(fechadura::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// `vault.encrypted_credentials` is not a usable AES-GCM blob.
    #[error("invalid `vault.encrypted_credentials`: {reason}")]
    #[diagnostic(
        code(fechadura::config::encrypted_credentials),
        help(
            "run `fechadura encrypt` and paste the printed value as \
             `encrypted_credentials` under [vault]"
        )
    )]
    InvalidCredentials {
        reason: String,
        #[label("not an encrypted credential blob")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A `[device]` setting the IoT data endpoint would reject.
    #[error("invalid `device.{key}`: {message}")]
    #[diagnostic(code(fechadura::config::device), help("{help}"))]
    InvalidDevice {
        /// Field name within `[device]`.
        key: &'static str,
        message: String,
        help: String,
        #[label("rejected value")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// Any other semantic check that failed.
    #[error("validation error: {message}")]
    #[diagnostic(code(fechadura::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(fechadura::config::other))]
    Other(String),
}

impl ConfigError {
    pub(crate) fn device(
        key: &'static str,
        message: impl Into<String>,
        help: impl Into<String>,
    ) -> Self {
        Self::InvalidDevice {
            key,
            message: message.into(),
            help: help.into(),
            span: None,
            src: None,
        }
    }

    pub(crate) fn credentials(reason: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            reason: reason.into(),
            span: None,
            src: None,
        }
    }
}

fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` into one `ConfigError` per underlying failure.
///
/// `toml_sources` are `(path, content)` pairs used to resolve spans.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let suggestion = suggest_key(field, expected);
                    let (span, src) = locate(&error, toml_sources, &path, field, key_span);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion,
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => {
                    // The path ends with the offending field.
                    let (span, src) = match path.split_last() {
                        Some((field, section)) => {
                            locate(&error, toml_sources, section, field, value_span)
                        }
                        None => (None, None),
                    };
                    ConfigError::InvalidType {
                        key: path.join("."),
                        detail: format!("found {actual}, expected {expected}"),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Point validation errors at the value that caused them.
///
/// `sources` are ordered highest precedence first, so the first file that
/// sets a key is the one whose value was used.
pub fn attach_source_spans(errors: &mut [ConfigError], sources: &[(String, String)]) {
    for error in errors.iter_mut() {
        let (section, field, span, src) = match error {
            ConfigError::InvalidCredentials { span, src, .. } => {
                ("vault", "encrypted_credentials", span, src)
            }
            ConfigError::InvalidDevice { key, span, src, .. } => ("device", *key, span, src),
            _ => continue,
        };
        let section = [section.to_string()];
        let found = sources.iter().find_map(|(path, content)| {
            value_span(content, &section, field).map(|value| (path, content, value))
        });
        if let Some((path, content, value)) = found {
            *span = Some(value);
            *src = Some(NamedSource::new(path, content.clone()));
        }
    }
}

type SpanFinder = fn(&str, &[String], &str) -> Option<SourceSpan>;

/// Resolve a span in the file figment blames, or failing that (inline
/// strings carry no file path) in the first source that has the key.
fn locate(
    error: &figment::Error,
    sources: &[(String, String)],
    section: &[String],
    field: &str,
    find: SpanFinder,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let blamed = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let candidates: Vec<&(String, String)> = match &blamed {
        Some(path) => sources.iter().filter(|(p, _)| p == path).take(1).collect(),
        None => sources.iter().collect(),
    };

    candidates
        .into_iter()
        .find_map(|(path, content)| {
            find(content, section, field)
                .map(|span| (Some(span), Some(NamedSource::new(path, content.clone()))))
        })
        .unwrap_or((None, None))
}

fn key_span(content: &str, section: &[String], field: &str) -> Option<SourceSpan> {
    find_key_offset(content, section, field).map(|offset| SourceSpan::new(offset.into(), field.len()))
}

/// Span of the value assigned to `field` in `section`, up to the line end.
pub fn value_span(content: &str, section: &[String], field: &str) -> Option<SourceSpan> {
    let key_at = find_key_offset(content, section, field)?;
    let line_end = content[key_at..]
        .find('\n')
        .map_or(content.len(), |i| key_at + i);
    let line = &content[key_at..line_end];
    let after_eq = &line[line.find('=')? + 1..];
    let value = after_eq.trim();
    let value_at = line_end - after_eq.len() + (after_eq.len() - after_eq.trim_start().len());
    Some(SourceSpan::new(value_at.into(), value.len()))
}

/// Byte offset of `field` inside the table named by `section` (empty for
/// the top level). Keys in later tables are not matched.
pub fn find_key_offset(content: &str, section: &[String], field: &str) -> Option<usize> {
    let wanted = section.join(".");
    let mut in_section = section.is_empty();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            let header = trimmed.trim_end().trim_start_matches('[').trim_end_matches(']');
            in_section = header.trim() == wanted;
        } else if in_section
            && let Some(after) = trimmed.strip_prefix(field)
            && after.trim_start().starts_with('=')
        {
            return Some(offset + line.len() - trimmed.len());
        }
        offset += line.len();
    }

    None
}

/// Best Jaro-Winkler match for `unknown` among `valid_keys`, if close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > best_score {
            best_score = score;
            best_match = Some(key.to_string());
        }
    }

    best_match
}

/// Render each error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> Vec<String> {
        vec!["device".to_string()]
    }

    #[test]
    fn suggest_endpoint_for_endpont() {
        let valid = &["endpoint", "region", "topic", "qos", "payload", "timeout_secs"];
        assert_eq!(suggest_key("endpont", valid), Some("endpoint".to_string()));
    }

    #[test]
    fn suggest_wrapped_key_name_for_typo() {
        let valid = &["encrypted_credentials", "wrapping_key_name", "wrapped_key_name"];
        assert_eq!(
            suggest_key("wraped_key_name", valid),
            Some("wrapped_key_name".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["endpoint", "region", "topic"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn find_key_offset_in_section() {
        let content = "[device]\nendpont = \"example.com\"\n";
        let o = find_key_offset(content, &device(), "endpont").unwrap();
        assert_eq!(&content[o..o + 7], "endpont");
    }

    #[test]
    fn find_key_offset_ignores_other_tables() {
        let content = "[log]\nqos = 3\n\n[device]\ntopic = \"porta\"\n";
        assert_eq!(find_key_offset(content, &device(), "qos"), None);

        let content = "[device]\nqos = 1\n[log]\nqos = 3\n";
        assert_eq!(find_key_offset(content, &device(), "qos"), Some(9));
    }

    #[test]
    fn find_key_offset_needs_whole_key() {
        let content = "[device]\nqos_level = 2\nqos=1\n";
        let o = find_key_offset(content, &device(), "qos").unwrap();
        assert_eq!(&content[o..], "qos=1\n");
    }

    #[test]
    fn value_span_covers_the_assigned_value() {
        let content = "[vault]\nencrypted_credentials = \"AQID_AAAA\"  \n";
        let span = value_span(content, &["vault".to_string()], "encrypted_credentials").unwrap();
        let start = span.offset();
        assert_eq!(&content[start..start + span.len()], "\"AQID_AAAA\"");
    }

    #[test]
    fn attach_source_spans_uses_first_source_setting_the_key() {
        let sources = vec![
            ("local.toml".to_string(), "[device]\ntopic = \"porta\"\n".to_string()),
            ("user.toml".to_string(), "[device]\nqos = 2\n".to_string()),
        ];
        let mut errors = vec![
            ConfigError::device("qos", "must be 0 or 1, got 2", "use 0 or 1"),
            ConfigError::Validation {
                message: "log.level `x` is unknown".to_string(),
            },
        ];

        attach_source_spans(&mut errors, &sources);

        match &errors[0] {
            ConfigError::InvalidDevice { span, src, .. } => {
                let span = span.expect("span attached");
                assert_eq!(span.offset(), "[device]\nqos = ".len());
                assert_eq!(span.len(), 1);
                assert_eq!(src.as_ref().unwrap().name(), "user.toml");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn credential_diagnostic_renders_label_and_help() {
        use miette::{GraphicalReportHandler, GraphicalTheme};

        let content = "[vault]\nencrypted_credentials = \"nope\"\n";
        let mut errors = vec![ConfigError::credentials("missing `_` separator")];
        attach_source_spans(&mut errors, &[("fechadura.toml".to_string(), content.to_string())]);

        let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
        let mut buf = String::new();
        handler.render_report(&mut buf, &errors[0]).unwrap();
        assert!(buf.contains("fechadura::config::encrypted_credentials"));
        assert!(buf.contains("not an encrypted credential blob"));
        assert!(buf.contains("fechadura encrypt"));
        assert!(buf.contains("fechadura.toml"));
    }
}
