//! OAuth 1.0a request signing for the Telldus Live API.
//!
//! This is the single HMAC-SHA1 signing flow the Telldus API needs, not a general
//! OAuth client. The header value is built from scratch: nonce and
//! timestamp, the canonical signature base string, the keyed digest, and
//! the final `Authorization: OAuth ...` rendering.

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::{distributions::Alphanumeric, Rng};
use sha1::Sha1;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha1 = Hmac<Sha1>;

/// RFC3986: everything except unreserved alphanumerics and `-._~` is
/// escaped, in both the base string and the header rendering.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const NONCE_LENGTH: usize = 32;

/// Telldus Live API credentials, immutable for the process lifetime.
#[derive(Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub public_key: String,
    pub private_key: String,
    pub token: String,
    pub token_secret: String,
}

// Secrets must never reach the logs, so Debug redacts everything but the
// consumer key.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("token", &"<redacted>")
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

/// Build the `Authorization` header value for one request.
///
/// `request_params` are the query parameters the request itself carries.
/// OAuth parameter names are reserved; a caller passing a colliding key is
/// a contract violation.
pub fn sign(
    method: &str,
    url: &str,
    credentials: &Credentials,
    request_params: &[(&str, &str)],
) -> String {
    let nonce = generate_nonce();
    let timestamp = generate_timestamp();
    sign_with(method, url, credentials, request_params, &nonce, &timestamp)
}

/// Deterministic core of [`sign`]: same inputs, same header.
pub(crate) fn sign_with(
    method: &str,
    url: &str,
    credentials: &Credentials,
    request_params: &[(&str, &str)],
    nonce: &str,
    timestamp: &str,
) -> String {
    let oauth_params = [
        ("oauth_consumer_key", credentials.public_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp),
        ("oauth_token", credentials.token.as_str()),
        ("oauth_version", "1.0"),
    ];

    let mut all_params: BTreeMap<&str, &str> = oauth_params.iter().copied().collect();
    for &(key, value) in request_params {
        debug_assert!(
            !all_params.contains_key(key),
            "request parameter '{}' collides with an OAuth parameter",
            key
        );
        all_params.insert(key, value);
    }

    let base_string = signature_base_string(method, url, &all_params);
    let signature = compute_signature(
        &base_string,
        &credentials.private_key,
        &credentials.token_secret,
    );

    let rendered: Vec<String> = oauth_params
        .iter()
        .copied()
        .chain(std::iter::once(("oauth_signature", signature.as_str())))
        .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
        .collect();

    format!("OAuth {}", rendered.join(", "))
}

/// `METHOD & enc(url) & enc(sorted key=value pairs)`. The BTreeMap already
/// holds the parameters in byte-lexicographic key order.
fn signature_base_string(method: &str, url: &str, params: &BTreeMap<&str, &str>) -> String {
    let param_string = params
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&param_string)
    )
}

/// `enc(private_key) & enc(token_secret)`; the token secret may be empty
/// but its slot is always present.
fn signing_key(private_key: &str, token_secret: &str) -> String {
    format!("{}&{}", encode(private_key), encode(token_secret))
}

fn compute_signature(base_string: &str, private_key: &str, token_secret: &str) -> String {
    let key = signing_key(private_key, token_secret);
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(base_string.as_bytes());
    general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

fn generate_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> Credentials {
        Credentials {
            public_key: "pubkey".to_string(),
            private_key: "privkey".to_string(),
            token: "token".to_string(),
            token_secret: "tokensecret".to_string(),
        }
    }

    #[test]
    fn encode_leaves_unreserved_characters_alone() {
        assert_eq!(encode("AZaz09-._~"), "AZaz09-._~");
        assert_eq!(encode("a b!/:="), "a%20b%21%2F%3A%3D");
    }

    #[test]
    fn base_string_sorts_and_double_encodes() {
        let params: BTreeMap<&str, &str> =
            [("b", "2"), ("a", "x y")].into_iter().collect();
        let base = signature_base_string("get", "https://api.telldus.com/json/devices/list", &params);
        assert_eq!(
            base,
            "GET&https%3A%2F%2Fapi.telldus.com%2Fjson%2Fdevices%2Flist&a%3Dx%2520y%26b%3D2"
        );
    }

    #[test]
    fn signing_key_keeps_empty_token_secret_slot() {
        assert_eq!(signing_key("priv", ""), "priv&");
        assert_eq!(signing_key("pr iv", "se/c"), "pr%20iv&se%2Fc");
    }

    #[test]
    fn sign_is_deterministic_for_fixed_nonce_and_timestamp() {
        let credentials = test_credentials();
        let params = [("supportedMethods", "23"), ("extras", "parameters")];
        let a = sign_with(
            "GET",
            "https://api.telldus.com/json/devices/list",
            &credentials,
            &params,
            "abcdefghijklmnopqrstuvwxyz012345",
            "1700000000",
        );
        let b = sign_with(
            "GET",
            "https://api.telldus.com/json/devices/list",
            &credentials,
            &params,
            "abcdefghijklmnopqrstuvwxyz012345",
            "1700000000",
        );
        assert_eq!(a, b);
    }

    #[test]
    fn nonce_changes_the_signature() {
        let credentials = test_credentials();
        let a = sign_with("GET", "https://x", &credentials, &[], "nonce-a", "1700000000");
        let b = sign_with("GET", "https://x", &credentials, &[], "nonce-b", "1700000000");
        assert_ne!(a, b);
    }

    #[test]
    fn header_has_stable_shape() {
        let credentials = test_credentials();
        let header = sign_with("GET", "https://x", &credentials, &[], "n", "1");

        assert!(header.starts_with("OAuth oauth_consumer_key=\"pubkey\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_version=\"1.0\""));
        // Signature is always the last entry
        let entries: Vec<&str> = header["OAuth ".len()..].split(", ").collect();
        assert_eq!(entries.len(), 7);
        assert!(entries[6].starts_with("oauth_signature=\""));
    }

    #[test]
    fn generated_nonce_is_32_alphanumeric_chars() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), NONCE_LENGTH);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn debug_redacts_secrets() {
        let rendered = format!("{:?}", test_credentials());
        assert!(rendered.contains("pubkey"));
        assert!(!rendered.contains("privkey"));
        assert!(!rendered.contains("tokensecret"));
    }
}
