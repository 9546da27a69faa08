//! Transport strategies for executing Admin API requests.
//!
//! [`Transport`] sends an already built [`AdminRequest`] and collects the raw
//! response. [`UploadStrategy`] covers the whole file upload, which either
//! goes through the client's transport ([`NativeMultipart`]) or through an
//! external `curl` process ([`CurlMultipart`]).

use crate::client::create_admin_client;
use crate::error::{GhostError, Result};
use crate::request::{self, AdminRequest};
use crate::response::ResultMap;
use crate::rest::AdminClient;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use std::time::Instant;
use tracing::{debug, warn};

/// Status and fully read body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        RawResponse {
            status,
            body: body.into(),
        }
    }
}

/// Executes a built request
pub trait Transport: Send + Sync {
    fn send(&self, request: AdminRequest) -> Result<RawResponse>;
}

/// Direct HTTP transport backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the default 10 second timeout
    pub fn new() -> Result<Self> {
        Ok(HttpTransport {
            client: create_admin_client()?,
        })
    }

    /// Create a transport around an existing client
    pub fn with_client(client: Client) -> Self {
        HttpTransport { client }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: AdminRequest) -> Result<RawResponse> {
        let method = request.method;
        let url = request.url.clone();

        let start = Instant::now();
        let http_request = request.into_http(&self.client)?;
        let http_response = self.client.execute(http_request)?;
        let status = http_response.status().as_u16();
        let body = http_response.bytes()?.to_vec();

        debug!(
            %method,
            %url,
            status,
            elapsed = ?start.elapsed(),
            "admin api request"
        );

        Ok(RawResponse { status, body })
    }
}

/// Uploads a local file to an Admin API endpoint
pub trait UploadStrategy: Send + Sync {
    fn upload(
        &self,
        client: &AdminClient,
        method: &str,
        endpoint: &str,
        headers: &HashMap<String, String>,
        path: &Path,
    ) -> Result<ResultMap>;
}

/// Builds a reqwest multipart form and sends it through the client's transport
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeMultipart;

impl UploadStrategy for NativeMultipart {
    fn upload(
        &self,
        client: &AdminClient,
        method: &str,
        endpoint: &str,
        headers: &HashMap<String, String>,
        path: &Path,
    ) -> Result<ResultMap> {
        let request = request::build_multipart(client.config(), method, endpoint, headers, path)?;
        debug!(path = %path.display(), url = %request.url, "uploading multipart form");
        client.dispatch(request)
    }
}

/// Runs an external `curl` and returns its standard output as `{"output": ...}`.
///
/// The HTTP status of the upload is not inspected: a rejected upload still
/// comes back as a success carrying the server's error text. No timeout is
/// applied to the child process.
#[derive(Debug, Clone)]
pub struct CurlMultipart {
    program: String,
}

impl CurlMultipart {
    pub fn new() -> Self {
        CurlMultipart {
            program: "curl".to_string(),
        }
    }

    /// Use another executable with curl-compatible flags
    pub fn with_program(program: impl Into<String>) -> Self {
        CurlMultipart {
            program: program.into(),
        }
    }

    /// Command-line arguments for uploading `path` with the given request headers
    fn arguments(&self, request: &AdminRequest, path: &Path) -> Result<Vec<String>> {
        let mut args = vec!["-X".to_string(), request.method.to_string()];

        for (name, value) in &request.headers {
            let value = value.to_str().map_err(|_| {
                GhostError::RequestBuild(format!("header {} is not printable", name))
            })?;
            args.push("-H".to_string());
            args.push(format!("{}: {}", name, value));
        }

        let path = path.to_string_lossy();
        args.push("-F".to_string());
        args.push(format!("file=@{}", path));
        args.push("-F".to_string());
        args.push(format!("ref={}", path));
        args.push(request.url.to_string());

        Ok(args)
    }
}

impl Default for CurlMultipart {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadStrategy for CurlMultipart {
    fn upload(
        &self,
        client: &AdminClient,
        method: &str,
        endpoint: &str,
        headers: &HashMap<String, String>,
        path: &Path,
    ) -> Result<ResultMap> {
        let mut headers = headers.clone();
        headers.retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
        headers.insert(CONTENT_TYPE.to_string(), "multipart/form-data".to_string());
        // Same method, URL and header policy as a JSON call; the body is left to curl
        let request = request::build(client.config(), method, endpoint, &headers, None)?;
        let request = AdminRequest {
            body: None,
            ..request
        };
        let args = self.arguments(&request, path)?;

        warn!(
            program = %self.program,
            url = %request.url,
            "uploading through external command; HTTP status is not checked"
        );

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| GhostError::Command(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(GhostError::Command(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let mut result = ResultMap::new();
        result.insert(
            "output".to_string(),
            Value::String(String::from_utf8_lossy(&output.stdout).into_owned()),
        );
        Ok(result)
    }
}
