use crate::error::{GhostError, Result};
use crate::request::AdminMethod;
use serde_json::{Map, Value};

/// ResultMap is the decoded JSON object returned by a successful call.
pub type ResultMap = Map<String, Value>;

/// Turn an HTTP status and body into a result map or an error.
///
/// * DELETE answered with 204 yields an empty map without looking at the body.
/// * Any status outside [200, 300) becomes [`GhostError::Http`] carrying the body text.
/// * Otherwise the body must decode as a JSON object.
pub fn normalize(method: AdminMethod, status: u16, body: &[u8]) -> Result<ResultMap> {
    if method == AdminMethod::Delete && status == 204 {
        return Ok(ResultMap::new());
    }

    if !(200..300).contains(&status) {
        return Err(GhostError::http(
            status,
            String::from_utf8_lossy(body).into_owned(),
        ));
    }

    serde_json::from_slice(body).map_err(GhostError::MalformedBody)
}

/// Get a value from a result map by a slash-separated path.
/// For example, "images/0/url" reads the `url` of the first uploaded image.
pub fn lookup<'a>(map: &'a ResultMap, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('/').filter(|s| !s.is_empty());

    let first = parts.next()?;
    let mut current = map.get(first)?;

    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(arr) => {
                let index: usize = part.parse().ok()?;
                arr.get(index)?
            }
            _ => return None,
        };
    }

    Some(current)
}

/// Get a string value from a result map by a slash-separated path
pub fn lookup_str<'a>(map: &'a ResultMap, path: &str) -> Option<&'a str> {
    lookup(map, path).and_then(Value::as_str)
}
