//! Borrow-requests component: the request lifecycle and owner/requester
//! views.
//!
//! A request starts `pending`. The owner approves it (`approved`, and the
//! item flips to borrowed) or discards it. Once the item comes back the
//! owner completes the request (`completed`). Approving one request
//! invalidates competing pending requests for the same item server-side.

use std::sync::Arc;

use serde::Deserialize;

use crate::client::{ApiClient, RequestOptions};
use crate::http::HttpMethod;
use crate::types::{NewBorrowRequest, RequestsResponse};

#[derive(Debug, Deserialize)]
struct PendingCount {
    count: u64,
}

/// Drives the `/requests` endpoints.
///
/// Every operation except [`RequestsService::pending_count`] returns a
/// [`RequestsResponse`]; failures surface as `success == false` with a
/// message, never as `Err`.
#[derive(Clone)]
pub struct RequestsService {
    api: Arc<ApiClient>,
}

impl RequestsService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Every borrow request.
    pub fn list(&self) -> RequestsResponse {
        match self.api.request("/requests", RequestOptions::default()) {
            Ok(requests) => RequestsResponse::requests(requests),
            Err(e) => RequestsResponse::failure(e),
        }
    }

    /// Requests targeting items owned by `owner_id`.
    pub fn by_owner(&self, owner_id: &str) -> RequestsResponse {
        let endpoint = format!("/requests/owner/{owner_id}");
        match self.api.request(&endpoint, RequestOptions::default()) {
            Ok(requests) => RequestsResponse::requests(requests),
            Err(e) => RequestsResponse::failure(e),
        }
    }

    /// Requests opened by `requester_id`.
    pub fn by_requester(&self, requester_id: &str) -> RequestsResponse {
        let endpoint = format!("/requests/requester/{requester_id}");
        match self.api.request(&endpoint, RequestOptions::default()) {
            Ok(requests) => RequestsResponse::requests(requests),
            Err(e) => RequestsResponse::failure(e),
        }
    }

    /// A single request by id.
    pub fn get(&self, request_id: &str) -> RequestsResponse {
        let endpoint = format!("/requests/{request_id}");
        match self.api.request(&endpoint, RequestOptions::default()) {
            Ok(request) => RequestsResponse::request(request),
            Err(e) => RequestsResponse::failure(e),
        }
    }

    /// Open a borrow request against an item.
    pub fn create(&self, request: &NewBorrowRequest) -> RequestsResponse {
        let options = match RequestOptions::json(HttpMethod::Post, request) {
            Ok(options) => options,
            Err(e) => return RequestsResponse::failure(e),
        };
        match self.api.request("/requests", options) {
            Ok(created) => {
                RequestsResponse::request(created).with_message("Request created successfully")
            }
            Err(e) => RequestsResponse::failure(e),
        }
    }

    /// Approve a pending request. The item is handed to the requester and
    /// competing pending requests are rejected.
    pub fn approve(&self, request_id: &str) -> RequestsResponse {
        self.transition(request_id, "approve", "Request approved")
    }

    /// Complete an approved request once the item is returned.
    pub fn complete(&self, request_id: &str) -> RequestsResponse {
        self.transition(request_id, "complete", "Request completed")
    }

    /// Turn down a pending request.
    ///
    /// The API has no distinct reject transition; turning a request down
    /// removes it, leaving no rejected record behind. The `rejected` status
    /// only ever appears on requests that lost to an approved sibling.
    pub fn reject(&self, request_id: &str) -> RequestsResponse {
        self.remove(request_id, "Request rejected")
    }

    /// Remove a request outright.
    pub fn delete(&self, request_id: &str) -> RequestsResponse {
        self.remove(request_id, "Request deleted")
    }

    /// How many pending requests an owner has waiting.
    ///
    /// Degrades silently: any failure reads as zero so a badge or notifier
    /// can poll without handling errors. Not for flows that must distinguish
    /// "none pending" from "could not ask".
    pub fn pending_count(&self, owner_id: &str) -> u64 {
        let endpoint = format!("/requests/owner/{owner_id}/pending-count");
        self.api
            .request::<PendingCount>(&endpoint, RequestOptions::default())
            .map(|pending| pending.count)
            .unwrap_or(0)
    }

    fn transition(&self, request_id: &str, action: &str, message: &str) -> RequestsResponse {
        let endpoint = format!("/requests/{request_id}/{action}");
        match self
            .api
            .request(&endpoint, RequestOptions::new(HttpMethod::Patch))
        {
            Ok(request) => RequestsResponse::request(request).with_message(message),
            Err(e) => RequestsResponse::failure(e),
        }
    }

    fn remove(&self, request_id: &str, message: &str) -> RequestsResponse {
        let endpoint = format!("/requests/{request_id}");
        match self
            .api
            .send(&endpoint, RequestOptions::new(HttpMethod::Delete))
        {
            Ok(()) => RequestsResponse::success(message),
            Err(e) => RequestsResponse::failure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::session::SessionContext;
    use crate::transport::testing::FakeTransport;
    use crate::types::RequestStatus;

    fn service_with(transport: Arc<FakeTransport>) -> RequestsService {
        let config = ClientConfig::new("http://backend.test/api");
        let api = Arc::new(ApiClient::new(
            &config,
            transport,
            SessionContext::in_memory(),
        ));
        RequestsService::new(api)
    }

    fn request_body(status: &str) -> String {
        format!(
            r#"{{
                "id": "r-1", "itemId": "i-1", "itemName": "Drill",
                "requesterId": "u-2", "requesterName": "Grace",
                "requesterEmail": "grace@example.com",
                "ownerId": "u-1", "ownerName": "Ada", "ownerEmail": "ada@example.com",
                "status": "{status}", "rating": 4.0,
                "createdAt": "2024-03-01T00:00:00Z"
            }}"#
        )
    }

    #[test]
    fn create_starts_pending() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(201, &request_body("pending"));
        let requests = service_with(transport.clone());

        let open = NewBorrowRequest {
            item_id: "i-1".to_string(),
            item_name: "Drill".to_string(),
            requester_id: "u-2".to_string(),
            requester_name: "Grace".to_string(),
            requester_email: "grace@example.com".to_string(),
            owner_id: "u-1".to_string(),
            owner_name: "Ada".to_string(),
            owner_email: "ada@example.com".to_string(),
            rating: 4.0,
        };
        let response = requests.create(&open);

        assert!(response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("Request created successfully")
        );
        assert_eq!(
            response.request.as_ref().map(|r| r.status),
            Some(RequestStatus::Pending)
        );
        let sent = transport.last_request();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.path, "http://backend.test/api/requests");
    }

    #[test]
    fn approve_patches_the_approve_endpoint() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(200, &request_body("approved"));
        let requests = service_with(transport.clone());

        let response = requests.approve("r-1");

        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("Request approved"));
        assert_eq!(
            response.request.as_ref().map(|r| r.status),
            Some(RequestStatus::Approved)
        );
        let sent = transport.last_request();
        assert_eq!(sent.method, HttpMethod::Patch);
        assert_eq!(sent.path, "http://backend.test/api/requests/r-1/approve");
    }

    #[test]
    fn complete_patches_the_complete_endpoint() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(200, &request_body("completed"));
        let requests = service_with(transport.clone());

        let response = requests.complete("r-1");

        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("Request completed"));
        assert_eq!(
            transport.last_request().path,
            "http://backend.test/api/requests/r-1/complete"
        );
    }

    #[test]
    fn reject_and_delete_share_the_wire_call() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(204, "");
        transport.push_json(204, "");
        let requests = service_with(transport.clone());

        let rejected = requests.reject("r-1");
        let deleted = requests.delete("r-2");

        assert_eq!(rejected.message.as_deref(), Some("Request rejected"));
        assert_eq!(deleted.message.as_deref(), Some("Request deleted"));
        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        for request in &sent {
            assert_eq!(request.method, HttpMethod::Delete);
        }
        assert_eq!(sent[0].path, "http://backend.test/api/requests/r-1");
        assert_eq!(sent[1].path, "http://backend.test/api/requests/r-2");
    }

    #[test]
    fn views_hit_their_paths() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(200, "[]");
        transport.push_json(200, "[]");
        transport.push_json(200, "[]");
        let requests = service_with(transport.clone());

        assert!(requests.list().success);
        assert!(requests.by_owner("u-1").success);
        assert!(requests.by_requester("u-2").success);

        let sent = transport.requests();
        assert_eq!(sent[0].path, "http://backend.test/api/requests");
        assert_eq!(sent[1].path, "http://backend.test/api/requests/owner/u-1");
        assert_eq!(
            sent[2].path,
            "http://backend.test/api/requests/requester/u-2"
        );
    }

    #[test]
    fn get_missing_request_fails_with_server_message() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(404, r#"{"message":"Request not found"}"#);
        let requests = service_with(transport);

        let response = requests.get("nope");

        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Request not found"));
    }

    #[test]
    fn pending_count_parses_the_count() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(200, r#"{"count": 3}"#);
        let requests = service_with(transport.clone());

        assert_eq!(requests.pending_count("u-1"), 3);
        assert_eq!(
            transport.last_request().path,
            "http://backend.test/api/requests/owner/u-1/pending-count"
        );
    }

    #[test]
    fn pending_count_reads_zero_on_any_failure() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_error("connection refused");
        transport.push_json(500, r#"{"message":"boom"}"#);
        transport.push_json(200, "not json");
        let requests = service_with(transport);

        assert_eq!(requests.pending_count("u-1"), 0);
        assert_eq!(requests.pending_count("u-1"), 0);
        assert_eq!(requests.pending_count("u-1"), 0);
    }
}
