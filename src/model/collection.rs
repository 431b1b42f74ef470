//! Postman collection data model
//!
//! A [`Collection`] is the portable form of a recorded session: an ordered
//! list of [`Item`]s, each pairing a canonical [`Request`] with the
//! response(s) expected for it.

use std::collections::HashMap;
use std::io;

use bytes::Bytes;
use http::header::HOST;
use http::{Method, Uri};
use http_body_util::{BodyExt, Full};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::null_as_default;
use crate::template::expand;
use crate::{GophermanError, Result};

/// Postman collection schema written into every new collection
pub const COLLECTION_SCHEMA: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Mode tag for raw string payloads
pub const MODE_RAW: &str = "raw";

/// Type tag for plain text headers
pub const HEADER_TYPE_TEXT: &str = "text";

/// An ordered set of request/response exchanges plus metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Collection {
    /// Collection metadata
    #[serde(default)]
    pub info: Info,
    /// Exchanges in recorded order
    #[serde(default, deserialize_with = "null_as_default")]
    pub item: Vec<Item>,
    /// Authentication descriptor, carried as opaque metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
}

/// Collection metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Info {
    /// Stable identifier
    #[serde(rename = "_postman_id", default)]
    pub id: String,
    /// Human readable name
    #[serde(default)]
    pub name: String,
    /// Schema URL
    #[serde(default)]
    pub schema: String,
}

/// Collection level authentication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Auth {
    /// Auth type tag, e.g. `bearer`
    #[serde(rename = "Type", default)]
    pub kind: String,
    /// Bearer token fields
    #[serde(default)]
    pub bearer: BearerAuth,
}

/// Bearer token auth fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BearerAuth {
    /// Field key
    #[serde(default)]
    pub key: String,
    /// Token value
    #[serde(default)]
    pub value: String,
    /// Value type tag
    #[serde(rename = "Type", default)]
    pub kind: String,
}

/// One named exchange
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    /// Item name, `"<METHOD> <request-URI>"` for recorded items
    #[serde(default)]
    pub name: String,
    /// The request
    #[serde(default)]
    pub request: Request,
    /// Expected responses; the first one is authoritative
    #[serde(default, deserialize_with = "null_as_default")]
    pub response: Vec<Response>,
}

/// A canonical HTTP request, independent of any live connection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Request {
    /// HTTP verb
    #[serde(default)]
    pub method: String,
    /// Headers, one entry per occurrence
    #[serde(default, deserialize_with = "null_as_default")]
    pub header: Vec<Header>,
    /// Body, absent when the request had none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    /// Target URL
    #[serde(rename = "URL", default)]
    pub url: Url,
}

/// A single header occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Header {
    /// Header key
    #[serde(default)]
    pub key: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Header value
    #[serde(default)]
    pub value: String,
    /// Type tag
    #[serde(rename = "Type", default)]
    pub kind: String,
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Body {
    /// Mode tag
    #[serde(default)]
    pub mode: String,
    /// Raw payload
    #[serde(default)]
    pub raw: String,
}

/// Expected or actual response. Headers are not modeled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    /// Mode tag
    #[serde(default)]
    pub mode: String,
    /// Raw payload
    #[serde(default)]
    pub raw: String,
    /// HTTP status code
    #[serde(default)]
    pub status: u16,
}

/// URL descriptor. `raw` is authoritative, the rest is derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Url {
    /// Full URL as seen by the recorder
    #[serde(default)]
    pub raw: String,
    /// Hostname split on `.`
    #[serde(default, deserialize_with = "null_as_default")]
    pub host: Vec<String>,
    /// Port, empty when implicit
    #[serde(default)]
    pub port: String,
    /// Path split on `/`
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: Vec<String>,
}

impl Collection {
    /// Create a collection with fresh metadata
    #[must_use]
    pub fn new(name: &str, items: Vec<Item>, auth: Option<Auth>) -> Self {
        Self {
            info: Info {
                id: collection_id(name),
                name: name.to_string(),
                schema: COLLECTION_SCHEMA.to_string(),
            },
            item: items,
            auth,
        }
    }

    /// First item with the given name, in sequence order
    #[must_use]
    pub fn item_with_name(&self, name: &str) -> Option<&Item> {
        self.item.iter().find(|item| item.name == name)
    }

    /// Decode a collection from JSON
    ///
    /// # Errors
    ///
    /// Returns `Decode` error if the JSON is malformed
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Encode the collection as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `Encode` error if serialization fails
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| GophermanError::Encode(e.to_string()))
    }
}

impl Item {
    /// Build an item for a recorded exchange
    #[must_use]
    pub fn recorded(request_uri: &str, request: Request, response: Option<Response>) -> Self {
        Self {
            name: format!("{} {request_uri}", request.method),
            request,
            response: response.into_iter().collect(),
        }
    }

    /// The expected response, if any was recorded
    #[must_use]
    pub fn expected_response(&self) -> Option<&Response> {
        self.response.first()
    }
}

impl Request {
    /// Convert a live request into canonical form, draining its body
    ///
    /// Returns the canonical request together with the live request
    /// reassembled around the drained body, so it can still be served.
    ///
    /// # Errors
    ///
    /// Returns `Io` error if the body cannot be fully drained
    pub async fn from_live<B>(request: http::Request<B>) -> Result<(Self, http::Request<Bytes>)>
    where
        B: hyper::body::Body,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = request.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| {
                GophermanError::Io(io::Error::other(format!("failed to read body: {e}")))
            })?
            .to_bytes();

        let canonical = Self::from_parts(&parts, &body);
        Ok((canonical, http::Request::from_parts(parts, body)))
    }

    /// Convert already-drained request parts into canonical form
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts, body: &[u8]) -> Self {
        let header = parts
            .headers
            .iter()
            .map(|(name, value)| Header {
                key: name.to_string(),
                name: name.to_string(),
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
                kind: HEADER_TYPE_TEXT.to_string(),
            })
            .collect();

        let body = (!body.is_empty()).then(|| Body {
            mode: MODE_RAW.to_string(),
            raw: String::from_utf8_lossy(body).into_owned(),
        });

        Self {
            method: parts.method.to_string(),
            header,
            body,
            url: Url::from_raw(&raw_url(parts)),
        }
    }

    /// Build an issuable request, expanding defined placeholders in the URL
    /// and header values
    ///
    /// Recorded text that is not a well-formed placeholder for a defined
    /// variable is sent verbatim. Returns `None` when no valid request can
    /// be constructed.
    #[must_use]
    pub fn to_live_request(
        &self,
        variables: &HashMap<String, String>,
    ) -> Option<http::Request<Full<Bytes>>> {
        let raw = expand(&self.url.raw, variables);
        let uri = match raw.parse::<Uri>() {
            Ok(uri) => uri,
            Err(e) => {
                debug!("Cannot parse URL {raw}: {e}");
                return None;
            }
        };
        let method = Method::from_bytes(self.method.as_bytes()).ok()?;

        let mut builder = http::Request::builder().method(method).uri(uri);
        for header in &self.header {
            let value = expand(&header.value, variables);
            builder = builder.header(header.key.as_str(), value);
        }

        let body = self
            .body
            .as_ref()
            .map(|b| Bytes::from(b.raw.clone()))
            .unwrap_or_default();

        builder.body(Full::new(body)).ok()
    }
}

impl Response {
    /// A raw-mode response
    #[must_use]
    pub fn raw(body: &[u8], status: u16) -> Self {
        Self {
            mode: MODE_RAW.to_string(),
            raw: String::from_utf8_lossy(body).into_owned(),
            status,
        }
    }

    /// Decode the raw payload as JSON into a caller-specified shape
    ///
    /// # Errors
    ///
    /// Returns `Decode` error if the payload does not match `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.raw)?)
    }
}

impl Url {
    /// Build a URL descriptor, decomposing the raw form
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let (host, port, path) = match raw.parse::<Uri>() {
            Ok(uri) => (
                uri.host().unwrap_or_default().to_string(),
                uri.port_u16().map(|p| p.to_string()).unwrap_or_default(),
                uri.path().to_string(),
            ),
            Err(_) => {
                let path = raw.split(['?', '#']).next().unwrap_or_default();
                (String::new(), String::new(), path.to_string())
            }
        };

        Self {
            raw: raw.to_string(),
            host: split_segments(&host, '.'),
            port,
            path: split_segments(path.trim_start_matches('/'), '/'),
        }
    }
}

/// Raw URL for a live request; origin-form targets are completed from the
/// Host header when one is present
fn raw_url(parts: &http::request::Parts) -> String {
    if parts.uri.authority().is_some() {
        return parts.uri.to_string();
    }

    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or("/", |pq| pq.as_str());

    match parts.headers.get(HOST).and_then(|h| h.to_str().ok()) {
        Some(host) if !host.is_empty() => format!("http://{host}{path_and_query}"),
        _ => path_and_query.to_string(),
    }
}

fn split_segments(value: &str, separator: char) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(separator).map(str::to_string).collect()
}

/// UUID-shaped identifier derived from the collection name
fn collection_id(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    let hex = hex::encode(&digest[..16]);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}
