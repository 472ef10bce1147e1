//! Transport seam between the client and the wire.
//!
//! [`Transport::execute`] returns `Err` only for transport-level failures
//! (connection refused, DNS, timeout). Any HTTP response, success or not,
//! comes back as `Ok` so the client layer owns status interpretation.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport over [`ureq`].
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Non-2xx statuses must surface as responses, not ureq errors.
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.new_agent(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(&request.path), &request.headers).call(),
            HttpMethod::Delete => {
                with_headers(self.agent.delete(&request.path), &request.headers).call()
            }
            HttpMethod::Post => send_body(
                with_headers(self.agent.post(&request.path), &request.headers),
                request.body.as_deref(),
            ),
            HttpMethod::Put => send_body(
                with_headers(self.agent.put(&request.path), &request.headers),
                request.body.as_deref(),
            ),
            HttpMethod::Patch => send_body(
                with_headers(self.agent.patch(&request.path), &request.headers),
                request.body.as_deref(),
            ),
        };

        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().unwrap_or_default();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for exercising the client without a socket.

    use std::collections::VecDeque;
    use std::sync::{Mutex, PoisonError};

    use super::*;

    /// Records every request and replays queued responses in order.
    pub(crate) struct FakeTransport {
        requests: Mutex<Vec<HttpRequest>>,
        responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    }

    impl FakeTransport {
        pub(crate) fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                responses: Mutex::new(VecDeque::new()),
            }
        }

        pub(crate) fn push_json(&self, status: u16, body: &str) {
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(Ok(HttpResponse {
                    status,
                    headers: vec![("content-type".to_string(), "application/json".to_string())],
                    body: body.to_string(),
                }));
        }

        pub(crate) fn push_error(&self, message: &str) {
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(Err(ApiError::Transport(message.to_string())));
        }

        pub(crate) fn requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub(crate) fn last_request(&self) -> HttpRequest {
            self.requests()
                .last()
                .cloned()
                .unwrap_or_else(|| panic!("no request was executed"))
        }
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request.clone());
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| panic!("no scripted response for {}", request.path))
        }
    }
}
