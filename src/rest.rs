use crate::client::Config;
use crate::error::{GhostError, Result};
use crate::request::{self, AdminRequest};
use crate::response::{normalize, ResultMap};
use crate::transport::{HttpTransport, NativeMultipart, Transport, UploadStrategy};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Endpoint receiving image uploads
pub const IMAGE_UPLOAD_ENDPOINT: &str = "/images/upload/";

/// Client for the Ghost Admin API.
///
/// Every call builds a fresh request (with a freshly signed token when the
/// caller did not pass `Authorization`), sends it through the configured
/// [`Transport`] and normalizes the response. The client holds no mutable
/// state and can be cloned and shared across threads.
#[derive(Clone)]
pub struct AdminClient {
    config: Config,
    transport: Arc<dyn Transport>,
    upload_strategy: Arc<dyn UploadStrategy>,
}

impl AdminClient {
    /// Create a client that talks HTTP directly
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }

    /// Create a client configured from `GHOST_API_URL` and `GHOST_STAFF_API_KEY`
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env())
    }

    /// Create a client sending requests through a custom transport
    pub fn with_transport<T>(config: Config, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        AdminClient {
            config,
            transport: Arc::new(transport),
            upload_strategy: Arc::new(NativeMultipart),
        }
    }

    /// Set the strategy used by [`upload`](Self::upload)
    pub fn with_upload_strategy<S>(mut self, strategy: S) -> Self
    where
        S: UploadStrategy + 'static,
    {
        self.upload_strategy = Arc::new(strategy);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Make an Admin API request and return the decoded response object
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, PUT or DELETE, any case)
    /// * `endpoint` - Endpoint below `/ghost/api/admin/`, e.g. `posts/`
    /// * `headers` - Extra request headers
    /// * `json_body` - Payload for POST and PUT
    pub fn request(
        &self,
        method: &str,
        endpoint: &str,
        headers: &HashMap<String, String>,
        json_body: Option<&Value>,
    ) -> Result<ResultMap> {
        let request = request::build(&self.config, method, endpoint, headers, json_body)?;
        self.dispatch(request)
    }

    /// Make an Admin API request and unmarshal the response into the target type
    pub fn apply<T>(
        &self,
        method: &str,
        endpoint: &str,
        json_body: Option<&Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let result = self.request(method, endpoint, &HashMap::new(), json_body)?;
        serde_json::from_value(Value::Object(result)).map_err(GhostError::MalformedBody)
    }

    pub fn get(&self, endpoint: &str) -> Result<ResultMap> {
        self.request("GET", endpoint, &HashMap::new(), None)
    }

    pub fn post(&self, endpoint: &str, json_body: &Value) -> Result<ResultMap> {
        self.request("POST", endpoint, &HashMap::new(), Some(json_body))
    }

    pub fn put(&self, endpoint: &str, json_body: &Value) -> Result<ResultMap> {
        self.request("PUT", endpoint, &HashMap::new(), Some(json_body))
    }

    pub fn delete(&self, endpoint: &str) -> Result<ResultMap> {
        self.request("DELETE", endpoint, &HashMap::new(), None)
    }

    /// Send an already built request and normalize the response
    pub fn dispatch(&self, request: AdminRequest) -> Result<ResultMap> {
        let method = request.method;
        let response = self.transport.send(request)?;
        normalize(method, response.status, &response.body)
    }

    /// Upload the file at `path` with the configured upload strategy
    pub fn upload(
        &self,
        method: &str,
        endpoint: &str,
        headers: &HashMap<String, String>,
        path: impl AsRef<Path>,
    ) -> Result<ResultMap> {
        self.upload_strategy
            .upload(self, method, endpoint, headers, path.as_ref())
    }

    /// Upload an image file to `/images/upload/`
    pub fn upload_image(&self, path: impl AsRef<Path>) -> Result<ResultMap> {
        self.upload("POST", IMAGE_UPLOAD_ENDPOINT, &HashMap::new(), path)
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
