//! Responses and the sender contract.

use std::io::{self, Write};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, IntoHeaderName, ALLOW, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;

use crate::error::DispatchError;
use crate::writer::ResponseWriter;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// Anything that can write itself to a [`ResponseWriter`].
///
/// Implementations write the status and headers, then the body, and return
/// the number of body bytes written.
pub trait ResponseSender {
    /// Writes this response.
    fn send(&self, writer: &mut ResponseWriter<'_>) -> io::Result<usize>;
}

/// A fully buffered response.
///
/// # Example
///
/// ```
/// use doze_core::Response;
/// use http::StatusCode;
/// use serde_json::json;
///
/// let response = Response::ok_json(&json!({ "id": 1 })).unwrap();
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.body().as_ref(), br#"{"id":1}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Creates an empty response with a status.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Sets a header, replacing any previous value.
    #[must_use]
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// A plain-text response.
    #[must_use]
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_header(CONTENT_TYPE, HeaderValue::from_static(TEXT))
            .with_body(body.into())
    }

    /// A JSON response.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Self, DispatchError> {
        let body = serde_json::to_vec(value)
            .map_err(|e| DispatchError::handler_with_source("failed to encode response", e))?;
        Ok(Self::new(status)
            .with_header(CONTENT_TYPE, HeaderValue::from_static(JSON))
            .with_body(body))
    }

    /// `200 OK` with a JSON body.
    pub fn ok_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, DispatchError> {
        Self::json(StatusCode::OK, value)
    }

    /// `201 Created` with a JSON body.
    pub fn created_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, DispatchError> {
        Self::json(StatusCode::CREATED, value)
    }

    /// `204 No Content`.
    #[must_use]
    pub fn no_content() -> Self {
        Self::text(StatusCode::NO_CONTENT, "No Content")
    }

    /// `404 Not Found`.
    #[must_use]
    pub fn not_found() -> Self {
        Self::text(StatusCode::NOT_FOUND, "Not Found")
    }

    /// `405 Method Not Allowed` with an `Allow` header.
    #[must_use]
    pub fn method_not_allowed(allowed: &[Method]) -> Self {
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let response = Self::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        match HeaderValue::from_str(&allow) {
            Ok(value) => response.with_header(ALLOW, value),
            Err(_) => response,
        }
    }

    /// `500 Internal Server Error`.
    #[must_use]
    pub fn internal_server_error() -> Self {
        Self::text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    /// A JSON error envelope carrying the error's status code.
    #[must_use]
    pub fn from_error(error: &DispatchError, request_id: Option<&str>) -> Self {
        let envelope = error.to_envelope(request_id);
        Self::json(error.status_code(), &envelope).unwrap_or_else(|_| {
            Self::new(error.status_code())
        })
    }

    /// The status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns a header value.
    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// The body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Converts into an [`http::Response`].
    #[must_use]
    pub fn into_http(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseSender for Response {
    fn send(&self, writer: &mut ResponseWriter<'_>) -> io::Result<usize> {
        let staged = writer.headers_mut();
        for name in self.headers.keys() {
            staged.remove(name);
        }
        for (name, value) in &self.headers {
            staged.append(name.clone(), value.clone());
        }
        writer.write_head(self.status)?;
        writer.write_all(&self.body)?;
        Ok(self.body.len())
    }
}
