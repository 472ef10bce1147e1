//! Items component: listing, search and the item CRUD surface.

use std::sync::Arc;

use crate::client::{ApiClient, RequestOptions};
use crate::http::HttpMethod;
use crate::types::{Item, ItemPatch, ItemsResponse, NewItem};

/// Drives the `/items` endpoints.
///
/// Every operation returns an [`ItemsResponse`]; failures surface as
/// `success == false` with a message, never as `Err`.
#[derive(Clone)]
pub struct ItemsService {
    api: Arc<ApiClient>,
}

impl ItemsService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Every listed item.
    pub fn list(&self) -> ItemsResponse {
        match self.api.request("/items", RequestOptions::default()) {
            Ok(items) => ItemsResponse::items(items),
            Err(e) => ItemsResponse::failure(e),
        }
    }

    /// Items listed by one owner.
    pub fn by_owner(&self, user_id: &str) -> ItemsResponse {
        let endpoint = format!("/items/user/{user_id}");
        match self.api.request(&endpoint, RequestOptions::default()) {
            Ok(items) => ItemsResponse::items(items),
            Err(e) => ItemsResponse::failure(e),
        }
    }

    /// A single item by id.
    pub fn get(&self, item_id: &str) -> ItemsResponse {
        let endpoint = format!("/items/{item_id}");
        match self.api.request(&endpoint, RequestOptions::default()) {
            Ok(item) => ItemsResponse::item(item),
            Err(e) => ItemsResponse::failure(e),
        }
    }

    /// List a new item.
    pub fn create(&self, listing: &NewItem) -> ItemsResponse {
        let options = match RequestOptions::json(HttpMethod::Post, listing) {
            Ok(options) => options,
            Err(e) => return ItemsResponse::failure(e),
        };
        match self.api.request("/items", options) {
            Ok(item) => ItemsResponse::item(item).with_message("Item created successfully"),
            Err(e) => ItemsResponse::failure(e),
        }
    }

    /// Update an item's descriptive fields.
    pub fn update(&self, item_id: &str, patch: &ItemPatch) -> ItemsResponse {
        let options = match RequestOptions::json(HttpMethod::Put, patch) {
            Ok(options) => options,
            Err(e) => return ItemsResponse::failure(e),
        };
        let endpoint = format!("/items/{item_id}");
        match self.api.request(&endpoint, options) {
            Ok(item) => ItemsResponse::item(item).with_message("Item updated successfully"),
            Err(e) => ItemsResponse::failure(e),
        }
    }

    /// Remove a listing.
    pub fn delete(&self, item_id: &str) -> ItemsResponse {
        let endpoint = format!("/items/{item_id}");
        match self
            .api
            .send(&endpoint, RequestOptions::new(HttpMethod::Delete))
        {
            Ok(()) => ItemsResponse::success("Item deleted successfully"),
            Err(e) => ItemsResponse::failure(e),
        }
    }

    /// Flip an item between available and borrowed.
    pub fn toggle_status(&self, item_id: &str) -> ItemsResponse {
        let endpoint = format!("/items/{item_id}/toggle-status");
        match self
            .api
            .request(&endpoint, RequestOptions::new(HttpMethod::Patch))
        {
            Ok(item) => ItemsResponse::item(item).with_message("Item status updated"),
            Err(e) => ItemsResponse::failure(e),
        }
    }

    /// Search listings by free-text query and category.
    ///
    /// An empty query is dropped from the URL, as is an absent, empty or
    /// `"all"` category. With neither filter the bare search endpoint
    /// returns everything.
    pub fn search(&self, query: &str, category: Option<&str>) -> ItemsResponse {
        let endpoint = search_endpoint(query, category);
        match self.api.request::<Vec<Item>>(&endpoint, RequestOptions::default()) {
            Ok(items) => ItemsResponse::items(items),
            Err(e) => ItemsResponse::failure(e),
        }
    }
}

fn search_endpoint(query: &str, category: Option<&str>) -> String {
    let mut params = Vec::new();
    if !query.is_empty() {
        params.push(format!("q={}", urlencoding::encode(query)));
    }
    if let Some(category) = category {
        if !category.is_empty() && category != "all" {
            params.push(format!("category={}", urlencoding::encode(category)));
        }
    }

    if params.is_empty() {
        "/items/search".to_string()
    } else {
        format!("/items/search?{}", params.join("&"))
    }
}
