//! Endpoint Descriptor
//!
//! Immutable value describing one logical network call: where it goes, how
//! its parameters are encoded, and how long the transport may take. The core
//! only reads endpoints; callers build them once and reuse them freely.

use std::time::Duration;

use serde_json::Value;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Head,
    Delete,
}

impl HttpMethod {
    /// Wire representation of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// How endpoint parameters are turned into wire bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterEncoding {
    /// Serialize parameters as a JSON request body.
    Json,
    /// Append parameters to the URL as query items.
    Url,
    /// No parameters; the body stays empty.
    #[default]
    None,
}

/// Response caching directive attached to a request.
///
/// The crate keeps no disk cache; the only observable effect is the
/// `Cache-Control` header emitted for [`CachePolicy::ReloadIgnoringLocalCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    #[default]
    UseProtocolDefault,
    ReloadIgnoringLocalCache,
    ReturnCacheDataElseLoad,
}

/// Description of one logical call's destination and encoding.
///
/// # Example
///
/// ```ignore
/// use lanyard_core::{Endpoint, HttpMethod, ParameterEncoding};
///
/// let endpoint = Endpoint::new("https://api.example.com", "/items")
///     .with_method(HttpMethod::Post)
///     .with_parameters(serde_json::json!({"name": "socket wrench"}))
///     .with_encoding(ParameterEncoding::Json);
/// ```
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Scheme and authority, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Path appended verbatim to `base_url`.
    pub path: String,
    /// HTTP method (`GET` by default).
    pub method: HttpMethod,
    /// Headers applied verbatim to the prepared request.
    pub headers: Option<Vec<(String, String)>>,
    /// Call parameters; interpretation depends on `encoding`.
    pub parameters: Option<Value>,
    /// Parameter encoding policy.
    pub encoding: ParameterEncoding,
    /// Per-request transport timeout.
    pub timeout: Duration,
    /// Caching directive.
    pub cache_policy: CachePolicy,
}

impl Endpoint {
    /// Creates an endpoint with GET, no parameters, and a 30 second timeout.
    pub fn new(base_url: &str, path: &str) -> Self {
        Endpoint {
            base_url: base_url.to_string(),
            path: path.to_string(),
            method: HttpMethod::Get,
            headers: None,
            parameters: None,
            encoding: ParameterEncoding::None,
            timeout: Duration::from_secs(30),
            cache_policy: CachePolicy::UseProtocolDefault,
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Adds a header, preserving any set before.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((name.to_string(), value.to_string()));
        self
    }

    /// Sets the call parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Sets the parameter encoding policy.
    #[must_use]
    pub fn with_encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the transport timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the caching directive.
    #[must_use]
    pub fn with_cache_policy(mut self, cache_policy: CachePolicy) -> Self {
        self.cache_policy = cache_policy;
        self
    }

    /// Full URL string (`base_url + path`), unparsed.
    pub fn url_string(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_defaults() {
        let endpoint = Endpoint::new("https://api.test", "/items");
        assert_eq!(endpoint.method, HttpMethod::Get);
        assert_eq!(endpoint.encoding, ParameterEncoding::None);
        assert_eq!(endpoint.timeout, Duration::from_secs(30));
        assert!(endpoint.headers.is_none());
        assert!(endpoint.parameters.is_none());
    }

    #[test]
    fn test_endpoint_url_string() {
        let endpoint = Endpoint::new("https://api.test", "/v1/items");
        assert_eq!(endpoint.url_string(), "https://api.test/v1/items");
    }

    #[test]
    fn test_endpoint_builder_chain() {
        let endpoint = Endpoint::new("https://api.test", "/items")
            .with_method(HttpMethod::Post)
            .with_header("Authorization", "Bearer token")
            .with_header("X-Trace", "1")
            .with_encoding(ParameterEncoding::Json)
            .with_timeout(Duration::from_secs(5));

        assert_eq!(endpoint.method, HttpMethod::Post);
        assert_eq!(endpoint.headers.as_ref().unwrap().len(), 2);
        assert_eq!(endpoint.encoding, ParameterEncoding::Json);
        assert_eq!(endpoint.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }
}
