//! Authentication component: login, signup, logout and session queries.

use std::sync::Arc;

use serde::Serialize;

use crate::client::{ApiClient, RequestOptions};
use crate::http::HttpMethod;
use crate::session::SessionContext;
use crate::types::{AuthPayload, AuthResponse, Credentials, SignupDetails, User};

/// Drives the `/auth` endpoints and keeps the session store in sync.
///
/// Login and signup never return `Err`; every outcome folds into an
/// [`AuthResponse`] whose `success` flag tells the caller what happened.
#[derive(Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
    session: SessionContext,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>, session: SessionContext) -> Self {
        Self { api, session }
    }

    /// Exchange credentials for a session. On success the token and profile
    /// are stored before the response is returned.
    pub fn login(&self, email: &str, password: &str) -> AuthResponse {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.establish_session("/auth/login", &credentials)
    }

    /// Register a new account. A successful signup logs the account in.
    pub fn signup(&self, name: &str, email: &str, password: &str) -> AuthResponse {
        let details = SignupDetails {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.establish_session("/auth/signup", &details)
    }

    fn establish_session<T: Serialize>(&self, endpoint: &str, payload: &T) -> AuthResponse {
        let options = match RequestOptions::json(HttpMethod::Post, payload) {
            Ok(options) => options,
            Err(e) => return AuthResponse::failure(e),
        };
        match self.api.request::<AuthPayload>(endpoint, options) {
            Ok(granted) => {
                if let Err(e) = self.session.write(&granted.token, &granted.user) {
                    return AuthResponse::failure(e);
                }
                AuthResponse::authenticated(granted)
            }
            Err(e) => AuthResponse::failure(e),
        }
    }

    /// Drop the stored session. Purely local; no request is made.
    pub fn logout(&self) {
        self.session.clear();
    }

    /// The cached profile of the logged-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::testing::FakeTransport;

    fn service_with(transport: Arc<FakeTransport>) -> AuthService {
        let session = SessionContext::in_memory();
        let config = ClientConfig::new("http://backend.test/api");
        let api = Arc::new(ApiClient::new(&config, transport, session.clone()));
        AuthService::new(api, session)
    }

    const AUTH_BODY: &str = r#"{
        "user": {
            "id": "u-1", "name": "Ada", "email": "ada@example.com",
            "rating": 4.5, "reviews": 12, "itemsShared": 3, "itemsBorrowed": 1,
            "location": "Porto", "bio": "Shares power tools",
            "joinedDate": "2024-02-01T00:00:00Z"
        },
        "token": "tok-123"
    }"#;

    #[test]
    fn successful_login_stores_token_and_profile() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(200, AUTH_BODY);
        let auth = service_with(transport.clone());

        let response = auth.login("ada@example.com", "hunter2");

        assert!(response.success);
        assert_eq!(response.token.as_deref(), Some("tok-123"));
        assert_eq!(response.user.as_ref().map(|u| u.id.as_str()), Some("u-1"));
        assert!(auth.is_authenticated());
        assert_eq!(auth.token().as_deref(), Some("tok-123"));
        assert_eq!(auth.current_user().map(|u| u.name), Some("Ada".to_string()));
    }

    #[test]
    fn login_posts_the_credentials() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(200, AUTH_BODY);
        let auth = service_with(transport.clone());

        auth.login("ada@example.com", "hunter2");

        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path, "http://backend.test/api/auth/login");
        let body: serde_json::Value =
            serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["password"], "hunter2");
    }

    #[test]
    fn failed_login_leaves_the_store_untouched() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(401, r#"{"message":"Invalid email or password"}"#);
        let auth = service_with(transport);

        let response = auth.login("ada@example.com", "wrong");

        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Invalid email or password"));
        assert!(response.user.is_none());
        assert!(response.token.is_none());
        assert!(!auth.is_authenticated());
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn signup_registers_and_logs_in() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(201, AUTH_BODY);
        let auth = service_with(transport.clone());

        let response = auth.signup("Ada", "ada@example.com", "hunter2");

        assert!(response.success);
        assert!(auth.is_authenticated());
        let request = transport.last_request();
        assert_eq!(request.path, "http://backend.test/api/auth/signup");
        let body: serde_json::Value =
            serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Ada");
    }

    #[test]
    fn transport_failure_degrades_to_an_envelope() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_error("connection refused");
        let auth = service_with(transport);

        let response = auth.login("ada@example.com", "hunter2");

        assert!(!response.success);
        assert!(response
            .message
            .as_deref()
            .is_some_and(|m| m.contains("connection refused")));
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn logout_clears_and_is_idempotent() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_json(200, AUTH_BODY);
        let auth = service_with(transport);

        auth.login("ada@example.com", "hunter2");
        assert!(auth.is_authenticated());

        auth.logout();
        assert!(!auth.is_authenticated());
        assert!(auth.current_user().is_none());

        auth.logout();
        assert!(!auth.is_authenticated());
    }
}
