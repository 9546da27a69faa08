//! # ghost-admin - Ghost Admin API client for Rust
//!
//! A small blocking client for the Ghost Admin REST API. Every request is
//! authenticated with a freshly signed, five minute HS256 token derived from
//! a staff API key, and responses are normalized into a JSON object or a
//! typed error.
//!
//! ## Features
//!
//! - Short-lived `Authorization: Ghost <token>` credentials, signed per request
//! - JSON requests with a pinned `Accept-Version`
//! - Image uploads as `multipart/form-data`, natively or through `curl`
//! - Uniform result shape: a JSON object map, or a [`GhostError`]
//! - Pluggable [`Transport`] for testing without a network
//!
//! ## Basic Usage
//!
//! ```no_run
//! use ghost_admin::{AdminClient, Config};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("https://blog.example.com", "64f1a2b3c4d5:6162...");
//!     let client = AdminClient::new(config)?;
//!
//!     let site = client.get("site/")?;
//!     println!("Site: {}", site["site"]["title"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Image Uploads
//!
//! ```no_run
//! use ghost_admin::{AdminClient, lookup_str};
//!
//! let client = AdminClient::from_env()?;
//! let result = client.upload_image("images/cover.png")?;
//! println!("Uploaded to {:?}", lookup_str(&result, "images/0/url"));
//! # Ok::<(), ghost_admin::GhostError>(())
//! ```
//!
//! ## Tokens
//!
//! ```no_run
//! let token = ghost_admin::sign("64f1a2b3c4d5:6162", None)?;
//! println!("Authorization: Ghost {}", token);
//! # Ok::<(), ghost_admin::GhostError>(())
//! ```

pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod rest;
pub mod token;
pub mod tools;
pub mod transport;

// Re-export main types for convenience
pub use client::{Config, ACCEPT_VERSION, ADMIN_API_PATH, REQUEST_TIMEOUT};
pub use error::{ErrorKind, GhostError, Result};
pub use request::{build, build_multipart, AdminMethod, AdminRequest, RequestBody};
pub use response::{lookup, lookup_str, normalize, ResultMap};
pub use rest::{AdminClient, IMAGE_UPLOAD_ENDPOINT};
pub use token::{sign, AdminClaims, StaffApiKey};
pub use tools::{ImageTools, ToolOutput};
pub use transport::{
    CurlMultipart, HttpTransport, NativeMultipart, RawResponse, Transport, UploadStrategy,
};

// Re-export serde_json for convenience
pub use serde_json::json;
