//! BloodHound token request signing
//!
//! Each request carries an HMAC-SHA256 signature chained over three inputs:
//!
//! 1. `HMAC(token_key, method ‖ path)`
//! 2. `HMAC(step1, request_date[..13])`, i.e. the date truncated to the hour
//! 3. `HMAC(step2, body)`
//!
//! The base64 of step 3 goes in the `Signature` header. The server repeats
//! the chain with its copy of the key.

use crate::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use hmac::{Hmac, Mac};
use hounds_common::types::Credentials;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// `User-Agent` sent with every signed request
pub const USER_AGENT: &str = concat!("hounds/", env!("CARGO_PKG_VERSION"));

/// Authorization scheme understood by the API
pub const AUTH_SCHEME: &str = "bhesignature";

/// Length of the date prefix covered by the signature (`YYYY-MM-DDTHH`)
const DATE_PREFIX_LEN: usize = 13;

/// Header values for one signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub authorization: String,
    pub request_date: String,
    pub signature: String,
}

/// Signs requests with a token pair
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
}

impl RequestSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Sign using the current local time
    pub fn sign(&self, method: &str, path: &str, body: &[u8]) -> Result<SignedHeaders> {
        self.sign_at(method, path, body, Local::now().fixed_offset())
    }

    /// Sign with an explicit request date
    pub fn sign_at(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
        date: DateTime<FixedOffset>,
    ) -> Result<SignedHeaders> {
        let request_date = date.to_rfc3339_opts(SecondsFormat::Micros, false);

        let operation_key = hmac(
            self.credentials.token_key().as_bytes(),
            format!("{}{}", method, path).as_bytes(),
        )?;
        let date_key = hmac(&operation_key, request_date[..DATE_PREFIX_LEN].as_bytes())?;
        let signature = hmac(&date_key, body)?;

        Ok(SignedHeaders {
            authorization: format!("{} {}", AUTH_SCHEME, self.credentials.token_id()),
            request_date,
            signature: STANDARD.encode(signature),
        })
    }
}

fn hmac(key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| anyhow::anyhow!("Invalid HMAC key: {}", e))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}
