//! Request context types.
//!
//! A [`Context`] is created for every inbound request and owned by the task
//! handling it. It carries the request, the response writer, the parameters
//! captured by the matched route and a bag of values that middleware and
//! actions use to talk to each other. Nothing in it is shared with other
//! requests.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use doze_router::{ParamValue, Params};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::DispatchResult;
use crate::response::ResponseSender;
use crate::writer::{ResponseSink, ResponseWriter};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps ids sortable in logs.
///
/// # Example
///
/// ```
/// use doze_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(RequestId::parse(&id.to_string()), Some(id));
/// assert_eq!(RequestId::parse("not-a-uuid"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a request ID from its hyphenated text form, as sent in headers.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RequestId> for Uuid {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

/// The route a request was dispatched to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// The full template, including any router prefix.
    pub template: String,
    /// The route name, if it has one.
    pub name: Option<String>,
}

/// Per-request state shared by middleware and the action.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use doze_core::{BufferedSink, Context, Response};
/// use http::{Request, StatusCode};
///
/// let mut sink = BufferedSink::new();
/// let request = Request::get("/users/7").body(Bytes::new()).unwrap();
/// {
///     let mut ctx = Context::new(request, &mut sink);
///     ctx.set("user", String::from("ann"));
///     assert_eq!(ctx.get::<String>("user").map(String::as_str), Some("ann"));
///
///     ctx.send(&Response::text(StatusCode::OK, "hi")).unwrap();
///     // the second send is dropped
///     ctx.send(&Response::text(StatusCode::CONFLICT, "again")).unwrap();
/// }
/// assert_eq!(sink.status(), Some(StatusCode::OK));
/// assert_eq!(sink.body(), b"hi");
/// ```
pub struct Context<'w> {
    request_id: RequestId,
    request: Request<Bytes>,
    writer: ResponseWriter<'w>,
    route: Option<RouteInfo>,
    params: Params,
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    chain_index: usize,
    started_at: Instant,
}

impl<'w> Context<'w> {
    /// Creates a context for a request whose response goes to `sink`.
    pub fn new(request: Request<Bytes>, sink: &'w mut dyn ResponseSink) -> Self {
        Self {
            request_id: RequestId::new(),
            request,
            writer: ResponseWriter::new(sink),
            route: None,
            params: Params::new(),
            values: HashMap::new(),
            extensions: HashMap::new(),
            chain_index: 0,
            started_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Replaces the request ID.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// The inbound request.
    #[must_use]
    pub const fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// The request path, without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    /// The request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// The request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        self.request.body()
    }

    /// Decodes the request body as JSON.
    pub fn bind_json<T: DeserializeOwned>(&self) -> DispatchResult<T> {
        Ok(serde_json::from_slice(self.request.body())?)
    }

    /// The raw query string, if any.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.request.uri().query()
    }

    /// Decodes the query string into `T`.
    ///
    /// A missing query string decodes like an empty one.
    pub fn query<T: DeserializeOwned>(&self) -> DispatchResult<T> {
        Ok(serde_urlencoded::from_str(self.query_string().unwrap_or(""))?)
    }

    /// Decodes an `application/x-www-form-urlencoded` body into `T`.
    pub fn bind_form<T: DeserializeOwned>(&self) -> DispatchResult<T> {
        Ok(serde_urlencoded::from_bytes(self.request.body())?)
    }

    /// Form values for the request, in order.
    ///
    /// `POST`, `PUT` and `PATCH` requests yield the values of a form body
    /// only. Other methods yield the query values followed by any form body
    /// values. A body counts as a form when its content type is
    /// `application/x-www-form-urlencoded`.
    pub fn form_data(&self) -> DispatchResult<Vec<(String, String)>> {
        let body_only = matches!(*self.method(), Method::POST | Method::PUT | Method::PATCH);
        let mut values: Vec<(String, String)> = if body_only {
            Vec::new()
        } else {
            self.query()?
        };
        if self.has_form_body() {
            values.extend(self.bind_form::<Vec<(String, String)>>()?);
        }
        Ok(values)
    }

    fn has_form_body(&self) -> bool {
        self.headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
    }

    /// The response writer.
    #[must_use]
    pub const fn writer(&self) -> &ResponseWriter<'w> {
        &self.writer
    }

    /// Mutable access to the response writer, for handlers that stream.
    pub fn writer_mut(&mut self) -> &mut ResponseWriter<'w> {
        &mut self.writer
    }

    /// The status written so far, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.writer.status()
    }

    /// Body bytes written so far.
    #[must_use]
    pub const fn bytes_written(&self) -> usize {
        self.writer.bytes_written()
    }

    /// Returns true once the response has been sent.
    #[must_use]
    pub const fn is_written(&self) -> bool {
        self.writer.is_written()
    }

    /// Sends a response unless one has already been sent.
    ///
    /// Returns the number of body bytes written, or `0` when the send was
    /// dropped because the response had already gone out.
    pub fn send<S: ResponseSender + ?Sized>(&mut self, response: &S) -> DispatchResult<usize> {
        if self.writer.is_written() {
            warn!(
                request_id = %self.request_id,
                status = ?self.writer.status(),
                "response already sent, dropping"
            );
            return Ok(0);
        }
        Ok(response.send(&mut self.writer)?)
    }

    /// The matched route.
    #[must_use]
    pub const fn route(&self) -> Option<&RouteInfo> {
        self.route.as_ref()
    }

    /// Records the matched route.
    pub fn set_route(&mut self, route: RouteInfo) {
        self.route = Some(route);
    }

    /// Parameters captured by the matched route.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Replaces the captured parameters.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// A captured parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// A captured parameter as an integer.
    #[must_use]
    pub fn param_int(&self, name: &str) -> Option<i64> {
        self.params.get_int(name)
    }

    /// A captured parameter as its raw text.
    #[must_use]
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.raw(name)
    }

    /// Stores a value under a string key, replacing any previous value.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Returns the value under `key` if it exists and has type `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref())
    }

    /// Mutable access to the value under `key`.
    pub fn get_mut<T: Any + Send + Sync>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut())
    }

    /// Removes and returns the value under `key`.
    pub fn remove<T: Any + Send + Sync>(&mut self, key: &str) -> Option<T> {
        let boxed = self.values.remove(key)?;
        match boxed.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(boxed) => {
                // wrong type, put it back
                self.values.insert(key.to_string(), boxed);
                None
            }
        }
    }

    /// Returns true if a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Stores a value keyed by its type.
    pub fn insert_extension<T: Any + Send + Sync>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Returns the extension of type `T`.
    #[must_use]
    pub fn extension<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Index of the chain step currently running.
    #[must_use]
    pub const fn chain_index(&self) -> usize {
        self.chain_index
    }

    /// Moves the chain cursor. Called by the chain runner.
    pub fn set_chain_index(&mut self, index: usize) {
        self.chain_index = index;
    }

    /// Time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("method", self.request.method())
            .field("path", &self.request.uri().path())
            .field("route", &self.route)
            .field("params", &self.params)
            .field("writer", &self.writer)
            .field("chain_index", &self.chain_index)
            .finish_non_exhaustive()
    }
}
