//! Request Encoder
//!
//! Turns an [`Endpoint`] plus parameters into a wire-ready
//! [`PreparedRequest`]: JSON body, URL-encoded query items, raw, or
//! multipart. Construction is deterministic and touches no global state;
//! every failure is a concrete [`ErrorKind`], never a silently dropped call.

use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::endpoint::{CachePolicy, Endpoint, HttpMethod, ParameterEncoding};
use crate::error::ErrorKind;

const CONTENT_TYPE: &str = "Content-Type";

/// Fully-formed request ready for transport dispatch.
///
/// Never mutated after construction, except for the multipart boundary
/// header injected by [`prepare_multipart`].
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl PreparedRequest {
    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    fn set_header_if_absent(&mut self, name: &str, value: &str) {
        if !self.has_header(name) {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }
}

/// One part of a multipart upload, in submission order.
#[derive(Debug, Clone)]
pub struct MultipartPart {
    pub name: String,
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Builds a [`PreparedRequest`] from an endpoint.
pub fn prepare(endpoint: &Endpoint) -> Result<PreparedRequest, ErrorKind> {
    let url = Url::parse(&endpoint.url_string()).map_err(|_| ErrorKind::BadUrl)?;

    let mut request = PreparedRequest {
        url,
        method: endpoint.method,
        headers: endpoint.headers.clone().unwrap_or_default(),
        body: None,
    };

    if endpoint.cache_policy == CachePolicy::ReloadIgnoringLocalCache {
        request.set_header_if_absent("Cache-Control", "no-cache");
    }

    match endpoint.encoding {
        ParameterEncoding::Json => {
            if let Some(parameters) = &endpoint.parameters {
                let body = serde_json::to_vec(parameters).map_err(|_| ErrorKind::EncodingFail)?;
                request.body = Some(body);
                request.set_header_if_absent(CONTENT_TYPE, "application/json");
            }
        }
        ParameterEncoding::Url => {
            encode_query(&mut request, endpoint.parameters.as_ref())?;
        }
        ParameterEncoding::None => {}
    }

    Ok(request)
}

/// Appends parameters as query items.
///
/// A non-empty parameter object is required; otherwise the URL is left
/// unmodified and no content-type is set.
fn encode_query(request: &mut PreparedRequest, parameters: Option<&Value>) -> Result<(), ErrorKind> {
    let Some(Value::Object(map)) = parameters else {
        return Ok(());
    };
    if map.is_empty() {
        return Ok(());
    }

    {
        let mut pairs = request.url.query_pairs_mut();
        for (key, value) in map {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                // Nested structures have no query-string representation.
                Value::Array(_) | Value::Object(_) => return Err(ErrorKind::EncodingFail),
            };
            pairs.append_pair(key, &rendered);
        }
    }

    request.set_header_if_absent(
        CONTENT_TYPE,
        "application/x-www-form-urlencoded; charset=utf-8",
    );
    Ok(())
}

/// Builds a multipart/form-data [`PreparedRequest`].
///
/// Parts are framed in order with a random UUID boundary:
/// `--boundary\r\n` headers `\r\n\r\n` bytes `\r\n`, terminated by
/// `--boundary--\r\n`. Exact byte sequencing matters for server
/// compatibility.
pub fn prepare_multipart(
    endpoint: &Endpoint,
    parts: &[MultipartPart],
) -> Result<PreparedRequest, ErrorKind> {
    let url = Url::parse(&endpoint.url_string()).map_err(|_| ErrorKind::BadUrl)?;

    let boundary = Uuid::new_v4().to_string();
    let mut body: Vec<u8> = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.name, part.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.mime_type).as_bytes());
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    let mut request = PreparedRequest {
        url,
        method: endpoint.method,
        headers: endpoint.headers.clone().unwrap_or_default(),
        body: Some(body),
    };

    // Boundary header injection is the one permitted post-construction mutation.
    request.headers.push((
        CONTENT_TYPE.to_string(),
        format!("multipart/form-data; boundary={}", boundary),
    ));

    Ok(request)
}
