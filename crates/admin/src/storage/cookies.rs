//! Read-only storage view over request cookies.
//!
//! The hosted backend's client library keeps its auth token in a cookie
//! named `sb-<project>-auth-token`. Large tokens are split into numbered
//! chunks (`<name>.0`, `<name>.1`, ...) and values may be stored as
//! `base64-<payload>`. [`CookieStorage`] reassembles and decodes them so the
//! core gate sees the same JSON the browser would have.

use std::collections::BTreeMap;

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use lifex_core::{Storage, StorageError};
use tower_sessions::cookie::Cookie;

const BASE64_PREFIX: &str = "base64-";

/// Request cookies exposed as read-only [`Storage`].
#[derive(Debug, Clone, Default)]
pub struct CookieStorage {
    items: BTreeMap<String, String>,
}

impl CookieStorage {
    /// Collect every cookie sent with the request.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut raw = BTreeMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(value) = header.to_str() else {
                continue;
            };
            for cookie in Cookie::split_parse(value).flatten() {
                raw.insert(cookie.name().to_owned(), cookie.value().to_owned());
            }
        }

        let items = join_chunks(raw)
            .into_iter()
            .map(|(name, value)| {
                let decoded = decode_value(&value);
                (name, decoded)
            })
            .collect();
        Self { items }
    }
}

impl Storage for CookieStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, _value: String) -> Result<(), StorageError> {
        Err(StorageError::ReadOnly {
            key: key.to_owned(),
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Err(StorageError::ReadOnly {
            key: key.to_owned(),
        })
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.items.keys().cloned().collect())
    }
}

/// Merge `<name>.<n>` chunks into a single `<name>` entry, in chunk order.
///
/// An unchunked cookie of the same name wins over its chunks.
fn join_chunks(raw: BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut whole = BTreeMap::new();
    let mut chunked: BTreeMap<String, BTreeMap<u32, String>> = BTreeMap::new();

    for (name, value) in raw {
        match split_chunk_name(&name) {
            Some((base, index)) => {
                chunked
                    .entry(base.to_owned())
                    .or_default()
                    .insert(index, value);
            }
            None => {
                whole.insert(name, value);
            }
        }
    }

    for (base, parts) in chunked {
        whole
            .entry(base)
            .or_insert_with(|| parts.into_values().collect());
    }
    whole
}

fn split_chunk_name(name: &str) -> Option<(&str, u32)> {
    let (base, suffix) = name.rsplit_once('.')?;
    if base.is_empty() || suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok().map(|index| (base, index))
}

/// Undo the encodings cookie values pick up on the way to the browser.
fn decode_value(value: &str) -> String {
    let unescaped = urlencoding::decode(value).map_or_else(|_| value.to_owned(), |v| v.into_owned());

    let Some(payload) = unescaped.strip_prefix(BASE64_PREFIX) else {
        return unescaped;
    };
    let trimmed = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD.decode(payload));
    match bytes.map(String::from_utf8) {
        Ok(Ok(decoded)) => decoded,
        _ => {
            tracing::debug!("cookie value has an undecodable base64 payload");
            unescaped
        }
    }
}
