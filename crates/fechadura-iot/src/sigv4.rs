// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AWS Signature Version 4 request signing.
//!
//! Only the subset the publisher needs: a single signed-header set
//! (`host;x-amz-date`), a hashed payload, and an `Authorization` header.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use fechadura_core::FechaduraError;

type HmacSha256 = Hmac<Sha256>;

/// Signing algorithm identifier.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

const SIGNED_HEADERS: &str = "host;x-amz-date";

/// The parts of an HTTP request that go into the signature.
#[derive(Debug, Clone, Copy)]
pub struct SigningInput<'a> {
    pub method: &'a str,
    /// `host[:port]` exactly as sent in the `Host` header.
    pub host: &'a str,
    /// Already-canonical path (see [`uri_encode`]).
    pub canonical_uri: &'a str,
    /// Already-canonical query string, keys sorted.
    pub canonical_query: &'a str,
    pub payload: &'a [u8],
}

/// Headers to attach to a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub amz_date: String,
    pub authorization: String,
}

/// Signs requests for one identity, region and service.
pub struct Signer<'a> {
    identifier: &'a str,
    secret: &'a SecretString,
    region: &'a str,
    service: &'a str,
}

impl<'a> Signer<'a> {
    pub fn new(
        identifier: &'a str,
        secret: &'a SecretString,
        region: &'a str,
        service: &'a str,
    ) -> Self {
        Self {
            identifier,
            secret,
            region,
            service,
        }
    }

    /// Sign `input` as of `at`.
    pub fn sign(
        &self,
        input: &SigningInput<'_>,
        at: DateTime<Utc>,
    ) -> Result<SignedHeaders, FechaduraError> {
        let amz_date = at.format("%Y%m%dT%H%M%SZ").to_string();
        let date = at.format("%Y%m%d").to_string();
        let scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);

        let request = canonical_request(input, &amz_date);
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(request.as_bytes()))
        );

        let key = signing_key(
            self.secret.expose_secret(),
            &date,
            self.region,
            self.service,
        )?;
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

        Ok(SignedHeaders {
            authorization: format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
                self.identifier
            ),
            amz_date,
        })
    }
}

/// Build the canonical request string for `input`.
pub fn canonical_request(input: &SigningInput<'_>, amz_date: &str) -> String {
    format!(
        "{}\n{}\n{}\nhost:{}\nx-amz-date:{amz_date}\n\n{SIGNED_HEADERS}\n{}",
        input.method,
        input.canonical_uri,
        input.canonical_query,
        input.host,
        hex::encode(Sha256::digest(input.payload))
    )
}

/// Derive the per-day signing key: an HMAC chain over date, region, service
/// and the `aws4_request` terminator, keyed by `"AWS4" + secret`.
pub fn signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<[u8; 32], FechaduraError> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<[u8; 32], FechaduraError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| FechaduraError::Internal(format!("HMAC key rejected: {e}")))?;
    mac.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Percent-encode everything except RFC 3986 unreserved characters.
/// `/` is kept as-is unless `encode_slash` is set.
pub fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
