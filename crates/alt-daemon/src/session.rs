// SPDX-License-Identifier: MIT OR Apache-2.0
//! Opaque session token issuance for `POST /login` (§4.1, §6).
//!
//! The token is `base64(json({tenant_id, user_id, issued_at, expires_at}))` —
//! an audit tag, not a credential: it is never verified by this crate, only
//! minted.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session lifetime (§4.1: `expiry = now + 3600s`).
pub const SESSION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    tenant_id: Option<String>,
    user_id: Option<String>,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// An opaque, base64-encoded session token and its expiry.
pub struct SessionToken {
    /// The encoded token string.
    pub token: String,
    /// Seconds until expiry, always [`SESSION_LIFETIME_SECS`] at mint time.
    pub expires_in: i64,
}

/// Mint a session token for `tenant_id`/`user_id` (either may be absent).
pub fn mint(tenant_id: Option<String>, user_id: Option<String>) -> SessionToken {
    let issued_at = Utc::now();
    let expires_at = issued_at + chrono::Duration::seconds(SESSION_LIFETIME_SECS);
    let claims = SessionClaims { tenant_id, user_id, issued_at, expires_at };
    let encoded = serde_json::to_vec(&claims).expect("session claims always serialize");
    SessionToken { token: BASE64.encode(encoded), expires_in: SESSION_LIFETIME_SECS }
}
