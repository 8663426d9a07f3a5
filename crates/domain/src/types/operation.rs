//! Declarative request descriptions and response payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::SYNTHETIC_MARKER_FIELD;

/// HTTP methods used by the backoffice services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

crate::impl_domain_status_conversions!(HttpMethod {
    Get => "GET",
    Post => "POST",
    Put => "PUT",
    Patch => "PATCH",
    Delete => "DELETE",
});

impl HttpMethod {
    /// Safe methods never change server state and may be retried freely.
    pub fn is_safe(self) -> bool {
        matches!(self, Self::Get)
    }
}

/// Operation class, selects the per-attempt timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationClass {
    /// JSON reads
    Read,
    /// JSON mutations
    Write,
    /// Binary document generation (PDF), streamed and unbounded
    Document,
}

crate::impl_domain_status_conversions!(OperationClass {
    Read => "read",
    Write => "write",
    Document => "document",
});

/// Expected response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    Json,
    Binary,
}

/// Declarative description of one logical request against a resource family.
///
/// The path is relative to the candidate's base address, so the same
/// operation can be replayed against any candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    pub shape: ResponseShape,
    pub class: OperationClass,
}

impl Operation {
    fn new(method: HttpMethod, path: impl Into<String>, body: Option<Value>) -> Self {
        let class = if method.is_safe() { OperationClass::Read } else { OperationClass::Write };
        Self { method, path: path.into(), query: Vec::new(), body, shape: ResponseShape::Json, class }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path, None)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path, Some(body))
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, path, Some(body))
    }

    /// Partial update, used for status transitions
    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Patch, path, Some(body))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path, None)
    }

    /// Binary download (e.g. an invoice PDF)
    pub fn document(path: impl Into<String>) -> Self {
        Self {
            shape: ResponseShape::Binary,
            class: OperationClass::Document,
            ..Self::new(HttpMethod::Get, path, None)
        }
    }

    /// Append a query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Whether this operation changes server state
    pub fn is_mutation(&self) -> bool {
        !self.method.is_safe()
    }

    /// Cache key for this query shape within a family namespace.
    ///
    /// Query parameters are sorted so `?a=1&b=2` and `?b=2&a=1` share an
    /// entry.
    pub fn cache_key(&self, family: &str) -> String {
        let mut query = self.query.clone();
        query.sort();
        let query = query.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
        let path = self.path.trim_end_matches('/');
        if query.is_empty() {
            format!("{family}|{}|{path}", self.method)
        } else {
            format!("{family}|{}|{path}?{query}", self.method)
        }
    }

    /// Trailing path segment, the resource identifier for detail operations
    /// such as `DELETE /products/17`.
    pub fn resource_id(&self) -> Option<&str> {
        self.path.trim_end_matches('/').rsplit('/').next().filter(|segment| !segment.is_empty())
    }
}

/// Response payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Payload {
    Json(Value),
    Binary(Vec<u8>),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Binary(_) => None,
        }
    }

    pub fn as_json_mut(&mut self) -> Option<&mut Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            Self::Json(_) => None,
        }
    }

    /// Whether the payload was produced by the fallback synthesizer.
    ///
    /// A JSON payload is synthetic when it, or any record in it, carries the
    /// synthetic marker; a document when its info dictionary carries the
    /// placeholder entry.
    pub fn is_synthetic(&self) -> bool {
        match self {
            Self::Json(Value::Array(records)) => records.iter().any(is_marked),
            Self::Json(value) => is_marked(value),
            Self::Binary(bytes) => bytes
                .windows(crate::constants::SYNTHETIC_PDF_MARKER.len())
                .any(|window| window == crate::constants::SYNTHETIC_PDF_MARKER),
        }
    }
}

fn is_marked(value: &Value) -> bool {
    value.get(SYNTHETIC_MARKER_FIELD).and_then(Value::as_bool).unwrap_or(false)
}
