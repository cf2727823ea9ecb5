// src/publish/oauth.rs
//
// OAuth 1.0a request signing (HMAC-SHA1), as required by the Twitter API for
// user-context requests.
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use url::Url;

use crate::errors::BotError;

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Clone)]
pub struct OAuth1Keys {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

fn enc(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

pub fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Signature base string: method, base URL and the sorted, encoded parameters.
/// `params` are the query/form parameters of the request; JSON bodies are not signed.
pub fn signature_base_string(
    method: &str,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String, BotError> {
    let mut base_url =
        Url::parse(url).map_err(|e| BotError::Configuration(format!("bad URL {url}: {e}")))?;
    base_url.set_query(None);
    base_url.set_fragment(None);

    let mut pairs: Vec<(String, String)> = params.iter().map(|(k, v)| (enc(k), enc(v))).collect();
    pairs.sort();
    let param_string = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        method.to_uppercase(),
        enc(base_url.as_str()),
        enc(&param_string)
    ))
}

pub fn sign(base_string: &str, consumer_secret: &str, token_secret: &str) -> Result<String, BotError> {
    let key = format!("{}&{}", enc(consumer_secret), enc(token_secret));
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| BotError::Auth(format!("invalid signing key: {e}")))?;
    mac.update(base_string.as_bytes());
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// `Authorization` header value for one request.
pub fn authorization_header(
    keys: &OAuth1Keys,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    nonce: &str,
    timestamp: i64,
) -> Result<String, BotError> {
    let timestamp = timestamp.to_string();
    let mut oauth = vec![
        ("oauth_consumer_key", keys.consumer_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", keys.access_token.as_str()),
        ("oauth_version", "1.0"),
    ];

    let mut all = oauth.clone();
    all.extend_from_slice(params);
    let base = signature_base_string(method, url, &all)?;
    let signature = sign(&base, &keys.consumer_secret, &keys.access_token_secret)?;

    oauth.push(("oauth_signature", signature.as_str()));
    oauth.sort();
    let fields = oauth
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", enc(k), enc(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {fields}"))
}
