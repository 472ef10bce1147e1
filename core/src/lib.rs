//! Client library for a peer-to-peer borrowing marketplace.
//!
//! The crate drives the marketplace REST API: authentication, item listings
//! and the borrow-request lifecycle. [`BorrowClient`] wires the pieces
//! together over a shared [`ApiClient`] and a durable [`SessionContext`];
//! component methods return `{ success, message?, data? }` envelopes instead
//! of `Result`, so callers branch on a flag and always have a message to
//! show when something went wrong.
//!
//! ```no_run
//! use borrow_core::{BorrowClient, ClientConfig};
//!
//! let client = BorrowClient::new(ClientConfig::from_env());
//!
//! let login = client.auth().login("ada@example.com", "hunter2");
//! if login.success {
//!     let listed = client.items().list();
//!     for item in listed.items.unwrap_or_default() {
//!         println!("{} ({:?})", item.name, item.status);
//!     }
//! }
//! ```
//!
//! Each component is also usable on its own against an [`ApiClient`] you
//! assemble yourself, which is how the tests drive them with a scripted
//! transport.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod items;
pub mod requests;
pub mod session;
pub mod transport;
pub mod types;

use std::sync::Arc;

pub use auth::AuthService;
pub use client::{ApiClient, RequestOptions};
pub use config::{ClientConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use items::ItemsService;
pub use requests::RequestsService;
pub use session::{FileStorage, MemoryStorage, SessionContext, Storage};
pub use transport::{Transport, UreqTransport};
pub use types::{
    AuthPayload, AuthResponse, BorrowRequest, Credentials, Item, ItemPatch, ItemStatus,
    ItemsResponse, NewBorrowRequest, NewItem, RequestStatus, RequestsResponse, SignupDetails, User,
};

/// The assembled client: one session, one API client, three components.
///
/// Two instances never share state unless they are built over the same
/// storage.
pub struct BorrowClient {
    session: SessionContext,
    auth: AuthService,
    items: ItemsService,
    requests: RequestsService,
}

impl BorrowClient {
    /// Client over the blocking [`UreqTransport`] with an in-memory session.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(UreqTransport::new()),
            Arc::new(MemoryStorage::new()),
        )
    }

    /// Client with a caller-provided session store, e.g. [`FileStorage`]
    /// for a session that survives restarts.
    pub fn with_storage(config: ClientConfig, storage: Arc<dyn Storage>) -> Self {
        Self::with_parts(config, Arc::new(UreqTransport::new()), storage)
    }

    /// Fully explicit assembly; used by tests to swap the transport.
    pub fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let session = SessionContext::new(storage);
        let api = Arc::new(ApiClient::new(&config, transport, session.clone()));
        Self {
            session: session.clone(),
            auth: AuthService::new(api.clone(), session),
            items: ItemsService::new(api.clone()),
            requests: RequestsService::new(api),
        }
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn items(&self) -> &ItemsService {
        &self.items
    }

    pub fn requests(&self) -> &RequestsService {
        &self.requests
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }
}
