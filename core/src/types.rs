//! Wire types for the borrow marketplace API.
//!
//! Field names serialize in camelCase to match the backend's JSON. The
//! response envelope types ([`AuthResponse`], [`ItemsResponse`],
//! [`RequestsResponse`]) are client-side only and never cross the wire;
//! they normalize every outcome into `{ success, message?, data? }` so
//! callers branch on a flag instead of matching on errors.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A marketplace account profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Average community rating, 0.0 when unrated.
    pub rating: f64,
    pub reviews: u32,
    pub items_shared: u32,
    pub items_borrowed: u32,
    pub location: String,
    pub bio: String,
    pub joined_date: String,
}

/// Lending state of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    Borrowed,
}

/// A listed item.
///
/// The borrow fields travel together: `borrowed_by`, `borrowed_at` and
/// `return_by` are set while `status` is [`ItemStatus::Borrowed`] and absent
/// otherwise. Owner fields are a snapshot taken at listing time, not a live
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub owner_id: String,
    pub owner_name: String,
    pub owner_email: String,
    pub location: String,
    pub image: String,
    pub status: ItemStatus,
    pub owner_rating: f64,
    pub owner_rating_count: u32,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrowed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrowed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_by: Option<String>,
}

/// Payload for listing a new item. The server assigns the id, the creation
/// timestamp, the status and the owner rating snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub owner_id: String,
    pub owner_name: String,
    pub owner_email: String,
    pub location: String,
    pub image: String,
}

/// Partial update for an item; absent fields are left unchanged.
///
/// Availability is not patchable here. The lending state only moves through
/// the toggle and request endpoints, which keep the borrow fields coherent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Lifecycle state of a borrow request.
///
/// `Pending` moves to `Approved` or `Rejected`; `Approved` moves to
/// `Completed` when the item comes back. `Rejected` and `Completed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

/// A borrow request tying a requester to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub id: String,
    pub item_id: String,
    pub item_name: String,
    pub requester_id: String,
    pub requester_name: String,
    pub requester_email: String,
    pub owner_id: String,
    pub owner_name: String,
    pub owner_email: String,
    pub status: RequestStatus,
    /// Requester's rating at request time, 0.0 when unrated.
    #[serde(default)]
    pub rating: f64,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

/// Payload for opening a borrow request. The server assigns the id, status
/// and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBorrowRequest {
    pub item_id: String,
    pub item_name: String,
    pub requester_id: String,
    pub requester_name: String,
    pub requester_email: String,
    pub owner_id: String,
    pub owner_name: String,
    pub owner_email: String,
    #[serde(default)]
    pub rating: f64,
}

/// Login payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Signup payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupDetails {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Successful authentication body: the profile plus its bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

/// Outcome of a login or signup attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResponse {
    pub success: bool,
    pub message: Option<String>,
    pub user: Option<User>,
    pub token: Option<String>,
}

impl AuthResponse {
    pub(crate) fn authenticated(granted: AuthPayload) -> Self {
        Self {
            success: true,
            message: None,
            user: Some(granted.user),
            token: Some(granted.token),
        }
    }

    pub(crate) fn failure(error: ApiError) -> Self {
        Self {
            success: false,
            message: Some(error.to_string()),
            user: None,
            token: None,
        }
    }
}

/// Outcome of an item operation. Single-item operations fill `item`, listing
/// operations fill `items`, delete fills neither.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemsResponse {
    pub success: bool,
    pub message: Option<String>,
    pub item: Option<Item>,
    pub items: Option<Vec<Item>>,
}

impl ItemsResponse {
    pub(crate) fn item(item: Item) -> Self {
        Self {
            success: true,
            message: None,
            item: Some(item),
            items: None,
        }
    }

    pub(crate) fn items(items: Vec<Item>) -> Self {
        Self {
            success: true,
            message: None,
            item: None,
            items: Some(items),
        }
    }

    pub(crate) fn success(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            item: None,
            items: None,
        }
    }

    pub(crate) fn failure(error: ApiError) -> Self {
        Self {
            success: false,
            message: Some(error.to_string()),
            item: None,
            items: None,
        }
    }

    pub(crate) fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

/// Outcome of a borrow-request operation, shaped like [`ItemsResponse`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestsResponse {
    pub success: bool,
    pub message: Option<String>,
    pub request: Option<BorrowRequest>,
    pub requests: Option<Vec<BorrowRequest>>,
}

impl RequestsResponse {
    pub(crate) fn request(request: BorrowRequest) -> Self {
        Self {
            success: true,
            message: None,
            request: Some(request),
            requests: None,
        }
    }

    pub(crate) fn requests(requests: Vec<BorrowRequest>) -> Self {
        Self {
            success: true,
            message: None,
            request: None,
            requests: Some(requests),
        }
    }

    pub(crate) fn success(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            request: None,
            requests: None,
        }
    }

    pub(crate) fn failure(error: ApiError) -> Self {
        Self {
            success: false,
            message: Some(error.to_string()),
            request: None,
            requests: None,
        }
    }

    pub(crate) fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_serializes_camel_case_and_omits_absent_borrow_fields() {
        let item = Item {
            id: "i-1".to_string(),
            name: "Drill".to_string(),
            description: "Cordless".to_string(),
            category: "tools".to_string(),
            condition: "Good".to_string(),
            owner_id: "u-1".to_string(),
            owner_name: "Ada".to_string(),
            owner_email: "ada@example.com".to_string(),
            location: "Porto".to_string(),
            image: "drill.jpg".to_string(),
            status: ItemStatus::Available,
            owner_rating: 4.5,
            owner_rating_count: 12,
            created_at: "2024-02-20T00:00:00Z".to_string(),
            borrowed_by: None,
            borrowed_at: None,
            return_by: None,
        };

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"ownerId\":\"u-1\""));
        assert!(json.contains("\"ownerRatingCount\":12"));
        assert!(json.contains("\"status\":\"available\""));
        assert!(json.contains("\"createdAt\":\"2024-02-20T00:00:00Z\""));
        assert!(!json.contains("borrowedBy"));
        assert!(!json.contains("returnBy"));
    }

    #[test]
    fn item_with_borrow_fields_roundtrips() {
        let json = r#"{
            "id": "i-1", "name": "Drill", "description": "Cordless",
            "category": "tools", "condition": "Good",
            "ownerId": "u-1", "ownerName": "Ada", "ownerEmail": "ada@example.com",
            "location": "Porto", "image": "drill.jpg",
            "status": "borrowed", "ownerRating": 4.5, "ownerRatingCount": 12,
            "createdAt": "2024-02-20T00:00:00Z",
            "borrowedBy": "u-2", "borrowedAt": "2024-03-01T00:00:00Z",
            "returnBy": "2024-03-15T00:00:00Z"
        }"#;

        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.status, ItemStatus::Borrowed);
        assert_eq!(item.borrowed_by.as_deref(), Some("u-2"));
        assert_eq!(item.return_by.as_deref(), Some("2024-03-15T00:00:00Z"));
    }

    #[test]
    fn request_statuses_use_lowercase_wire_names() {
        for (status, wire) in [
            (RequestStatus::Pending, "\"pending\""),
            (RequestStatus::Approved, "\"approved\""),
            (RequestStatus::Rejected, "\"rejected\""),
            (RequestStatus::Completed, "\"completed\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), wire);
        }
    }

    #[test]
    fn item_patch_serializes_only_set_fields() {
        let patch = ItemPatch {
            condition: Some("Worn".to_string()),
            ..ItemPatch::default()
        };

        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, "{\"condition\":\"Worn\"}");
    }

    #[test]
    fn borrow_request_rating_defaults_to_zero() {
        let json = r#"{
            "id": "r-1", "itemId": "i-1", "itemName": "Drill",
            "requesterId": "u-2", "requesterName": "Grace",
            "requesterEmail": "grace@example.com",
            "ownerId": "u-1", "ownerName": "Ada", "ownerEmail": "ada@example.com",
            "status": "pending", "createdAt": "2024-03-01T00:00:00Z"
        }"#;

        let request: BorrowRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.rating, 0.0);
        assert!(request.approved_at.is_none());
    }

    #[test]
    fn failure_envelopes_always_carry_a_message() {
        let response = ItemsResponse::failure(ApiError::Http {
            status: 404,
            message: "Item not found".to_string(),
        });
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Item not found"));

        let response = RequestsResponse::failure(ApiError::Transport("refused".to_string()));
        assert!(!response.success);
        assert!(response.message.as_deref().is_some_and(|m| !m.is_empty()));
    }
}
