use crate::client::{Config, ACCEPT_VERSION};
use crate::error::{GhostError, Result};
use crate::token::StaffApiKey;
use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, Request};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use url::Url;

/// Header carrying the pinned Admin API version
pub const ACCEPT_VERSION_HEADER: &str = "accept-version";

/// HTTP methods accepted by the Admin API client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl AdminMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminMethod::Get => "GET",
            AdminMethod::Post => "POST",
            AdminMethod::Put => "PUT",
            AdminMethod::Delete => "DELETE",
        }
    }

    /// Whether a JSON payload is sent with this method
    pub fn has_body(&self) -> bool {
        matches!(self, AdminMethod::Post | AdminMethod::Put)
    }
}

impl FromStr for AdminMethod {
    type Err = GhostError;

    /// Parse a method name, ignoring case
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(AdminMethod::Get),
            "POST" => Ok(AdminMethod::Post),
            "PUT" => Ok(AdminMethod::Put),
            "DELETE" => Ok(AdminMethod::Delete),
            other => Err(GhostError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for AdminMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AdminMethod> for reqwest::Method {
    fn from(method: AdminMethod) -> Self {
        match method {
            AdminMethod::Get => reqwest::Method::GET,
            AdminMethod::Post => reqwest::Method::POST,
            AdminMethod::Put => reqwest::Method::PUT,
            AdminMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Request payload
#[derive(Debug)]
pub enum RequestBody {
    /// Serialized JSON document
    Json(Vec<u8>),
    /// `multipart/form-data` form, read from disk when the request is sent
    Multipart(Form),
}

impl RequestBody {
    /// Serialized JSON bytes, `None` for a multipart form
    pub fn as_json(&self) -> Option<&[u8]> {
        match self {
            RequestBody::Json(bytes) => Some(bytes),
            RequestBody::Multipart(_) => None,
        }
    }
}

/// Fully formed outbound Admin API request
#[derive(Debug)]
pub struct AdminRequest {
    pub method: AdminMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl AdminRequest {
    /// Get a header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Convert into a reqwest request executed by `client`
    pub fn into_http(self, client: &Client) -> Result<Request> {
        let AdminRequest {
            method,
            url,
            mut headers,
            body,
        } = self;

        let builder = client.request(method.into(), url);
        let builder = match body {
            Some(RequestBody::Json(bytes)) => builder.headers(headers).body(bytes),
            Some(RequestBody::Multipart(form)) => {
                // reqwest sets the boundary header from the form itself
                headers.remove(CONTENT_TYPE);
                builder.headers(headers).multipart(form)
            }
            None => builder.headers(headers),
        };

        Ok(builder.build()?)
    }
}

/// Build the absolute URL for an Admin API endpoint.
///
/// Leading and trailing slashes on the endpoint are ignored and the path is
/// given a single trailing slash, so `/images/upload/` and `images/upload`
/// resolve to the same URL. A query string, if any, is kept as given.
pub fn endpoint_url(config: &Config, endpoint: &str) -> Result<Url> {
    let (path, query) = match endpoint.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (endpoint, None),
    };
    let path = path.trim_matches('/');

    let mut url = format!("{}/{}", config.admin_url(), path);
    if !path.is_empty() {
        url.push('/');
    }
    if let Some(query) = query {
        url.push('?');
        url.push_str(query);
    }

    Ok(Url::parse(&url)?)
}

/// Build a JSON Admin API request.
///
/// # Arguments
/// * `config` - Site URL and staff API key
/// * `method` - HTTP method, case-insensitive (GET, POST, PUT or DELETE)
/// * `endpoint` - Endpoint below `/ghost/api/admin/`
/// * `headers` - Caller headers; `Accept-Version` and `Authorization` are filled in when missing
/// * `json_body` - Payload for POST and PUT, ignored otherwise
pub fn build(
    config: &Config,
    method: &str,
    endpoint: &str,
    headers: &HashMap<String, String>,
    json_body: Option<&Value>,
) -> Result<AdminRequest> {
    let method: AdminMethod = method.parse()?;
    let url = endpoint_url(config, endpoint)?;

    let body = if method.has_body() {
        // A missing payload is sent as JSON null
        let bytes = serde_json::to_vec(json_body.unwrap_or(&Value::Null))?;
        Some(RequestBody::Json(bytes))
    } else {
        None
    };

    let mut headers = apply_headers(config, headers)?;
    if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    Ok(AdminRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Build a multipart upload request for the file at `path`.
///
/// The form carries the file under `file` and the path itself under `ref`.
/// `Content-Type` is always replaced with the form's boundary header.
pub fn build_multipart(
    config: &Config,
    method: &str,
    endpoint: &str,
    headers: &HashMap<String, String>,
    path: &Path,
) -> Result<AdminRequest> {
    let method: AdminMethod = method.parse()?;
    let url = endpoint_url(config, endpoint)?;

    let form = Form::new()
        .file("file", path)?
        .text("ref", path.to_string_lossy().into_owned());
    let content_type = format!("multipart/form-data; boundary={}", form.boundary());

    let mut headers = apply_headers(config, headers)?;
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .map_err(|_| GhostError::RequestBuild("invalid multipart boundary".to_string()))?,
    );

    Ok(AdminRequest {
        method,
        url,
        headers,
        body: Some(RequestBody::Multipart(form)),
    })
}

/// Copy caller headers and fill in `Accept-Version` and `Authorization`
fn apply_headers(config: &Config, headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut header_map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| GhostError::RequestBuild(format!("invalid header name: {}", key)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| GhostError::RequestBuild(format!("invalid value for header {}", key)))?;
        header_map.insert(name, value);
    }

    if is_blank(&header_map, ACCEPT_VERSION_HEADER) {
        header_map.insert(
            HeaderName::from_static(ACCEPT_VERSION_HEADER),
            HeaderValue::from_static(ACCEPT_VERSION),
        );
    }

    if is_blank(&header_map, AUTHORIZATION.as_str()) {
        let authorization = StaffApiKey::parse(&config.staff_api_key)?.authorization_header()?;
        let mut value = HeaderValue::from_str(&authorization)
            .map_err(|_| GhostError::RequestBuild("invalid authorization token".to_string()))?;
        value.set_sensitive(true);
        header_map.insert(AUTHORIZATION, value);
    }

    Ok(header_map)
}

fn is_blank(headers: &HeaderMap, name: &str) -> bool {
    headers.get(name).map_or(true, |v| v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::token::AdminClaims;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
    use serde_json::json;

    fn config() -> Config {
        Config::new("https://blog.example.com/", "myid:6162")
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("post".parse::<AdminMethod>().unwrap(), AdminMethod::Post);
        assert_eq!("Delete".parse::<AdminMethod>().unwrap(), AdminMethod::Delete);
        assert_eq!("GET".parse::<AdminMethod>().unwrap(), AdminMethod::Get);
        assert_eq!("put".parse::<AdminMethod>().unwrap(), AdminMethod::Put);
        assert!(matches!(
            " Delete ".parse::<AdminMethod>(),
            Err(GhostError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_unsupported_methods() {
        // Only case is normalized; surrounding whitespace is rejected
        let methods = [
            "PATCH", "patch", "HEAD", "OPTIONS", "", "GETS", "CONNECT", " Delete ", "GET\n",
        ];
        for method in methods {
            let err = build(&config(), method, "posts", &HashMap::new(), None).unwrap_err();
            assert!(matches!(err, GhostError::UnsupportedMethod(_)), "{:?}", method);
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn test_url_slash_variants_match() {
        let expected = "https://blog.example.com/ghost/api/admin/images/upload/";
        for endpoint in ["/images/upload/", "images/upload", "images/upload/", "//images/upload"] {
            assert_eq!(endpoint_url(&config(), endpoint).unwrap().as_str(), expected);
        }
    }

    #[test]
    fn test_url_keeps_query() {
        let url = endpoint_url(&config(), "/posts/?limit=5&filter=tag:news").unwrap();
        assert_eq!(
            url.as_str(),
            "https://blog.example.com/ghost/api/admin/posts/?limit=5&filter=tag:news"
        );
    }

    #[test]
    fn test_url_without_base_fails() {
        let config = Config::new("", "myid:6162");
        let err = build(&config, "GET", "posts", &HashMap::new(), None).unwrap_err();
        assert!(matches!(err, GhostError::UrlParse(_)));
    }

    #[test]
    fn test_build_post_scenario() {
        let request = build(
            &config(),
            "post",
            "/images/upload/",
            &HashMap::new(),
            Some(&json!({"posts": [{"title": "Hello"}]})),
        )
        .unwrap();

        assert_eq!(request.method, AdminMethod::Post);
        assert_eq!(
            request.url.as_str(),
            "https://blog.example.com/ghost/api/admin/images/upload/"
        );
        assert_eq!(request.header("accept-version"), Some(ACCEPT_VERSION));
        assert_eq!(request.header("content-type"), Some("application/json"));

        let token = request
            .header("authorization")
            .and_then(|h| h.strip_prefix("Ghost "))
            .expect("Ghost authorization header");
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["/admin/"]);
        let claims = decode::<AdminClaims>(token, &DecodingKey::from_secret(b"ab"), &validation)
            .unwrap()
            .claims;
        assert_eq!(claims.sub, "myid");

        let body: Value = serde_json::from_slice(request.body.unwrap().as_json().unwrap()).unwrap();
        assert_eq!(body["posts"][0]["title"], "Hello");
    }

    #[test]
    fn test_build_get_and_delete_have_no_body() {
        let payload = json!({"ignored": true});
        for method in ["GET", "DELETE"] {
            let request = build(&config(), method, "posts/1", &HashMap::new(), Some(&payload)).unwrap();
            assert!(request.body.is_none());
            assert!(request.header("content-type").is_none());
        }
    }

    #[test]
    fn test_build_put_without_payload_sends_null() {
        let request = build(&config(), "PUT", "posts/1", &HashMap::new(), None).unwrap();
        let body = request.body.as_ref().and_then(RequestBody::as_json);
        assert_eq!(body, Some(&b"null"[..]));
    }

    #[test]
    fn test_caller_headers_take_precedence() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Ghost preset".to_string());
        headers.insert("Accept-Version".to_string(), "v6.0".to_string());
        headers.insert("Content-Type".to_string(), "application/vnd.custom+json".to_string());
        headers.insert("X-Trace".to_string(), "abc".to_string());

        // A bad key only matters when the client has to sign
        let config = Config::new("https://blog.example.com", "not-a-key");
        let request = build(&config, "POST", "posts", &headers, None).unwrap();

        assert_eq!(request.header("authorization"), Some("Ghost preset"));
        assert_eq!(request.header("accept-version"), Some("v6.0"));
        assert_eq!(request.header("content-type"), Some("application/vnd.custom+json"));
        assert_eq!(request.header("x-trace"), Some("abc"));
    }

    #[test]
    fn test_empty_headers_are_defaulted() {
        let mut headers = HashMap::new();
        headers.insert("Accept-Version".to_string(), String::new());
        headers.insert("Authorization".to_string(), String::new());

        let request = build(&config(), "GET", "site", &headers, None).unwrap();
        assert_eq!(request.header("accept-version"), Some(ACCEPT_VERSION));
        assert!(request.header("authorization").unwrap().starts_with("Ghost "));
    }

    #[test]
    fn test_signing_failure_aborts_build() {
        let config = Config::new("https://blog.example.com", "myid:xyz");
        let err = build(&config, "GET", "site", &HashMap::new(), None).unwrap_err();
        assert!(matches!(err, GhostError::InvalidSecret(_)));
    }

    #[test]
    fn test_invalid_header_name() {
        let mut headers = HashMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        let err = build(&config(), "GET", "site", &headers, None).unwrap_err();
        assert!(matches!(err, GhostError::RequestBuild(_)));
    }

    #[test]
    fn test_build_multipart_overrides_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.jpg");
        std::fs::write(&path, b"jpeg bytes").unwrap();

        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let request = build_multipart(&config(), "post", "/images/upload/", &headers, &path).unwrap();
        let boundary = match &request.body {
            Some(RequestBody::Multipart(form)) => form.boundary().to_string(),
            other => panic!("expected multipart body, got {:?}", other),
        };
        assert_eq!(
            request.header("content-type").unwrap(),
            format!("multipart/form-data; boundary={}", boundary)
        );

        let mut http = request.into_http(&Client::new()).unwrap();
        let content_types: Vec<_> = http.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(content_types.len(), 1);
        assert!(content_types[0].to_str().unwrap().ends_with(&boundary));
        assert_eq!(http.headers().get(AUTHORIZATION).map(|v| v.is_sensitive()), Some(true));

        let body = http.body_mut().as_mut().unwrap().buffer().unwrap();
        let body = String::from_utf8_lossy(body).into_owned();
        assert!(body.contains(&boundary));
        assert!(body.contains(r#"name="file"; filename="cover.jpg""#));
        assert!(body.to_ascii_lowercase().contains("content-type: image/jpeg"));
        assert!(body.contains("jpeg bytes"));
        assert!(body.contains(r#"name="ref""#));
        assert!(body.contains(&path.to_string_lossy().into_owned()));
    }

    #[test]
    fn test_json_request_into_http() {
        let payload = json!({"a": 1});
        let request = build(&config(), "PUT", "posts/1", &HashMap::new(), Some(&payload)).unwrap();
        let http = request.into_http(&Client::new()).unwrap();

        assert_eq!(http.method(), &reqwest::Method::PUT);
        assert_eq!(
            http.url().as_str(),
            "https://blog.example.com/ghost/api/admin/posts/1/"
        );
        assert_eq!(http.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(http.body().and_then(|b| b.as_bytes()), Some(&br#"{"a":1}"#[..]));
    }

    #[test]
    fn test_build_multipart_missing_file() {
        let err = build_multipart(
            &config(),
            "POST",
            "images/upload",
            &HashMap::new(),
            Path::new("/nonexistent/cover.jpg"),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
