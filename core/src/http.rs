//! HTTP messages as plain data.
//!
//! # Design
//! The client builds `HttpRequest` values and interprets `HttpResponse`
//! values; a [`Transport`](crate::transport::Transport) performs the actual
//! round trip in between. Keeping the boundary as owned data makes request
//! construction deterministic and unit-testable without touching a network.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// An HTTP request described as plain data.
///
/// `path` is the full URL (base address already concatenated). Headers are
/// ordered; later entries for the same name are meant to replace earlier
/// ones, which the client guarantees when it assembles them.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Produced by a transport after executing an [`HttpRequest`]; the client
/// decides what the status and body mean.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
