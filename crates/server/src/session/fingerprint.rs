//! Client fingerprinting.
//!
//! A session is bound to the address and user-agent the client had when it
//! logged in. The binding is a SHA-256 digest, so the stored value reveals
//! nothing and is only ever compared for equality.

use sha2::{Digest, Sha256};
use std::net::IpAddr;

/// Separator between the signed parts. Cannot appear in a header value, an
/// IP address or a base64url token.
const DELIMITER: &[u8] = b"\n";

/// Compute the fingerprint signature of `token` for the given client.
///
/// `token` is always the encoded string handed to the client, both at issuance
/// and at validation.
pub fn sign(token: &str, client_address: &str, user_agent: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.update(DELIMITER);
    hasher.update(client_address.as_bytes());
    hasher.update(DELIMITER);
    hasher.update(user_agent.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Pick the address a request is attributed to.
///
/// The last `X-Forwarded-For` entry wins (it was appended by the proxy closest
/// to us), then the peer address of the connection, then nothing. An empty last
/// entry, as left by a trailing comma, counts as no forwarded address.
pub fn resolve_client_address(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> String {
    forwarded_for
        .and_then(|header| header.rsplit(',').next())
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|ip| ip.to_string()))
        .unwrap_or_default()
}
