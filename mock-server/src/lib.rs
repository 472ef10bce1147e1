//! In-memory stand-in for the borrow marketplace backend. Serves the same
//! REST surface under `/api` so the client crate can run end-to-end tests
//! without a real deployment.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Loan length used for `returnBy` when an item is handed over.
pub const BORROW_PERIOD_DAYS: i64 = 14;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub rating: f64,
    pub reviews: u32,
    pub items_shared: u32,
    pub items_borrowed: u32,
    pub location: String,
    pub bio: String,
    pub joined_date: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    Borrowed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
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

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
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
    #[serde(default)]
    pub rating: f64,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PendingCount {
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupDetails {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
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

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
}

#[derive(Deserialize)]
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

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
}

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
pub struct MarketState {
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    items: Vec<Item>,
    requests: Vec<BorrowRequest>,
}

pub type Db = Arc<RwLock<MarketState>>;

type ErrorReply = (StatusCode, Json<ErrorMessage>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(MarketState::default()));
    Router::new().nest("/api", api_routes()).with_state(db)
}

fn api_routes() -> Router<Db> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/items", get(list_items).post(create_item))
        .route("/items/search", get(search_items))
        .route("/items/user/{user_id}", get(items_by_owner))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/items/{id}/toggle-status", patch(toggle_item_status))
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/owner/{owner_id}", get(requests_by_owner))
        .route("/requests/owner/{owner_id}/pending-count", get(pending_count))
        .route("/requests/requester/{requester_id}", get(requests_by_requester))
        .route("/requests/{id}", get(get_request).delete(delete_request))
        .route("/requests/{id}/approve", patch(approve_request))
        .route("/requests/{id}/complete", patch(complete_request))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error_reply(status: StatusCode, message: &str) -> ErrorReply {
    (
        status,
        Json(ErrorMessage {
            message: message.to_string(),
        }),
    )
}

fn not_found(what: &str) -> ErrorReply {
    error_reply(StatusCode::NOT_FOUND, &format!("{what} not found"))
}

fn unauthorized() -> ErrorReply {
    error_reply(StatusCode::UNAUTHORIZED, "Authentication required")
}

/// Resolves the bearer token to a user id. Mutating endpoints call this
/// before touching state.
fn check_auth(state: &MarketState, headers: &HeaderMap) -> Result<String, ErrorReply> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;
    state.tokens.get(token).cloned().ok_or_else(unauthorized)
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn due_date() -> String {
    (Utc::now() + Duration::days(BORROW_PERIOD_DAYS)).to_rfc3339()
}

// --- auth ---

async fn login(
    State(db): State<Db>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthPayload>, ErrorReply> {
    let mut state = db.write().await;
    let user = state
        .accounts
        .iter()
        .find(|account| {
            account.user.email == credentials.email && account.password == credentials.password
        })
        .map(|account| account.user.clone())
        .ok_or_else(|| error_reply(StatusCode::UNAUTHORIZED, "Invalid email or password"))?;

    let token = Uuid::new_v4().to_string();
    state.tokens.insert(token.clone(), user.id.clone());
    Ok(Json(AuthPayload { user, token }))
}

async fn signup(
    State(db): State<Db>,
    Json(details): Json<SignupDetails>,
) -> Result<(StatusCode, Json<AuthPayload>), ErrorReply> {
    let mut state = db.write().await;
    if state
        .accounts
        .iter()
        .any(|account| account.user.email == details.email)
    {
        return Err(error_reply(StatusCode::CONFLICT, "Email already registered"));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: details.name,
        email: details.email,
        rating: 0.0,
        reviews: 0,
        items_shared: 0,
        items_borrowed: 0,
        location: String::new(),
        bio: String::new(),
        joined_date: now(),
    };
    let token = Uuid::new_v4().to_string();
    state.tokens.insert(token.clone(), user.id.clone());
    state.accounts.push(Account {
        user: user.clone(),
        password: details.password,
    });
    Ok((StatusCode::CREATED, Json(AuthPayload { user, token })))
}

// --- items ---

async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    let state = db.read().await;
    Json(state.items.clone())
}

async fn items_by_owner(State(db): State<Db>, Path(user_id): Path<String>) -> Json<Vec<Item>> {
    let state = db.read().await;
    Json(
        state
            .items
            .iter()
            .filter(|item| item.owner_id == user_id)
            .cloned()
            .collect(),
    )
}

async fn search_items(
    State(db): State<Db>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Item>> {
    let state = db.read().await;
    let query = params.q.unwrap_or_default().to_lowercase();
    Json(
        state
            .items
            .iter()
            .filter(|item| {
                let text_match = query.is_empty()
                    || item.name.to_lowercase().contains(&query)
                    || item.description.to_lowercase().contains(&query);
                let category_match = params
                    .category
                    .as_deref()
                    .map_or(true, |category| item.category == category);
                text_match && category_match
            })
            .cloned()
            .collect(),
    )
}

async fn get_item(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Item>, ErrorReply> {
    let state = db.read().await;
    state
        .items
        .iter()
        .find(|item| item.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Item"))
}

async fn create_item(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(listing): Json<NewItem>,
) -> Result<(StatusCode, Json<Item>), ErrorReply> {
    let mut state = db.write().await;
    check_auth(&state, &headers)?;

    // The listing carries a rating snapshot of the owner at creation time.
    let (owner_rating, owner_rating_count) = state
        .accounts
        .iter()
        .find(|account| account.user.id == listing.owner_id)
        .map(|account| (account.user.rating, account.user.reviews))
        .unwrap_or((0.0, 0));

    let item = Item {
        id: Uuid::new_v4().to_string(),
        name: listing.name,
        description: listing.description,
        category: listing.category,
        condition: listing.condition,
        owner_id: listing.owner_id,
        owner_name: listing.owner_name,
        owner_email: listing.owner_email,
        location: listing.location,
        image: listing.image,
        status: ItemStatus::Available,
        owner_rating,
        owner_rating_count,
        created_at: now(),
        borrowed_by: None,
        borrowed_at: None,
        return_by: None,
    };
    state.items.push(item.clone());
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<Item>, ErrorReply> {
    let mut state = db.write().await;
    check_auth(&state, &headers)?;
    let item = state
        .items
        .iter_mut()
        .find(|item| item.id == id)
        .ok_or_else(|| not_found("Item"))?;
    if let Some(name) = patch.name {
        item.name = name;
    }
    if let Some(description) = patch.description {
        item.description = description;
    }
    if let Some(category) = patch.category {
        item.category = category;
    }
    if let Some(condition) = patch.condition {
        item.condition = condition;
    }
    if let Some(location) = patch.location {
        item.location = location;
    }
    if let Some(image) = patch.image {
        item.image = image;
    }
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ErrorReply> {
    let mut state = db.write().await;
    check_auth(&state, &headers)?;
    let before = state.items.len();
    state.items.retain(|item| item.id != id);
    if state.items.len() == before {
        return Err(not_found("Item"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_item_status(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Item>, ErrorReply> {
    let mut state = db.write().await;
    let caller = check_auth(&state, &headers)?;
    let item = state
        .items
        .iter_mut()
        .find(|item| item.id == id)
        .ok_or_else(|| not_found("Item"))?;
    match item.status {
        ItemStatus::Available => {
            item.status = ItemStatus::Borrowed;
            item.borrowed_by = Some(caller);
            item.borrowed_at = Some(now());
            item.return_by = Some(due_date());
        }
        ItemStatus::Borrowed => {
            item.status = ItemStatus::Available;
            item.borrowed_by = None;
            item.borrowed_at = None;
            item.return_by = None;
        }
    }
    Ok(Json(item.clone()))
}

// --- requests ---

async fn list_requests(State(db): State<Db>) -> Json<Vec<BorrowRequest>> {
    let state = db.read().await;
    Json(state.requests.clone())
}

async fn requests_by_owner(
    State(db): State<Db>,
    Path(owner_id): Path<String>,
) -> Json<Vec<BorrowRequest>> {
    let state = db.read().await;
    Json(
        state
            .requests
            .iter()
            .filter(|request| request.owner_id == owner_id)
            .cloned()
            .collect(),
    )
}

async fn requests_by_requester(
    State(db): State<Db>,
    Path(requester_id): Path<String>,
) -> Json<Vec<BorrowRequest>> {
    let state = db.read().await;
    Json(
        state
            .requests
            .iter()
            .filter(|request| request.requester_id == requester_id)
            .cloned()
            .collect(),
    )
}

async fn get_request(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<BorrowRequest>, ErrorReply> {
    let state = db.read().await;
    state
        .requests
        .iter()
        .find(|request| request.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Request"))
}

async fn create_request(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(open): Json<NewBorrowRequest>,
) -> Result<(StatusCode, Json<BorrowRequest>), ErrorReply> {
    let mut state = db.write().await;
    check_auth(&state, &headers)?;
    if !state.items.iter().any(|item| item.id == open.item_id) {
        return Err(not_found("Item"));
    }

    let request = BorrowRequest {
        id: Uuid::new_v4().to_string(),
        item_id: open.item_id,
        item_name: open.item_name,
        requester_id: open.requester_id,
        requester_name: open.requester_name,
        requester_email: open.requester_email,
        owner_id: open.owner_id,
        owner_name: open.owner_name,
        owner_email: open.owner_email,
        status: RequestStatus::Pending,
        rating: open.rating,
        created_at: now(),
        approved_at: None,
        completed_at: None,
    };
    state.requests.push(request.clone());
    Ok((StatusCode::CREATED, Json(request)))
}

async fn approve_request(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<BorrowRequest>, ErrorReply> {
    let mut state = db.write().await;
    check_auth(&state, &headers)?;
    let MarketState {
        items, requests, ..
    } = &mut *state;

    let position = requests
        .iter()
        .position(|request| request.id == id)
        .ok_or_else(|| not_found("Request"))?;
    if requests[position].status != RequestStatus::Pending {
        return Err(error_reply(
            StatusCode::CONFLICT,
            "Only pending requests can be approved",
        ));
    }

    let item_id = requests[position].item_id.clone();
    let requester_id = requests[position].requester_id.clone();
    if let Some(item) = items.iter_mut().find(|item| item.id == item_id) {
        item.status = ItemStatus::Borrowed;
        item.borrowed_by = Some(requester_id);
        item.borrowed_at = Some(now());
        item.return_by = Some(due_date());
    }
    // The approved request takes the item; competing pending requests lose.
    for sibling in requests.iter_mut() {
        if sibling.item_id == item_id
            && sibling.id != id
            && sibling.status == RequestStatus::Pending
        {
            sibling.status = RequestStatus::Rejected;
        }
    }

    let request = &mut requests[position];
    request.status = RequestStatus::Approved;
    request.approved_at = Some(now());
    Ok(Json(request.clone()))
}

async fn complete_request(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<BorrowRequest>, ErrorReply> {
    let mut state = db.write().await;
    check_auth(&state, &headers)?;
    let MarketState {
        accounts,
        items,
        requests,
        ..
    } = &mut *state;

    let position = requests
        .iter()
        .position(|request| request.id == id)
        .ok_or_else(|| not_found("Request"))?;
    if requests[position].status != RequestStatus::Approved {
        return Err(error_reply(
            StatusCode::CONFLICT,
            "Only approved requests can be completed",
        ));
    }

    let item_id = requests[position].item_id.clone();
    if let Some(item) = items.iter_mut().find(|item| item.id == item_id) {
        item.status = ItemStatus::Available;
        item.borrowed_by = None;
        item.borrowed_at = None;
        item.return_by = None;
    }
    for account in accounts.iter_mut() {
        if account.user.id == requests[position].owner_id {
            account.user.items_shared += 1;
        }
        if account.user.id == requests[position].requester_id {
            account.user.items_borrowed += 1;
        }
    }

    let request = &mut requests[position];
    request.status = RequestStatus::Completed;
    request.completed_at = Some(now());
    Ok(Json(request.clone()))
}

async fn delete_request(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ErrorReply> {
    let mut state = db.write().await;
    check_auth(&state, &headers)?;
    let before = state.requests.len();
    state.requests.retain(|request| request.id != id);
    if state.requests.len() == before {
        return Err(not_found("Request"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn pending_count(
    State(db): State<Db>,
    Path(owner_id): Path<String>,
) -> Json<PendingCount> {
    let state = db.read().await;
    let count = state
        .requests
        .iter()
        .filter(|request| request.owner_id == owner_id && request.status == RequestStatus::Pending)
        .count();
    Json(PendingCount { count })
}
