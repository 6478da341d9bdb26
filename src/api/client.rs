use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::transport::{HttpRequest, HttpTransport, Method, ReqwestTransport};
use super::ApiError;
use crate::session::SessionStore;

/// Single entry point for backend calls.
///
/// Attaches the bearer token for authenticated calls, encodes and decodes JSON,
/// and turns non-2xx answers into [`ApiError`]. A 401/403 on an authenticated
/// call invalidates the shared session before the error is returned, unless
/// the rejected token has been replaced in the meantime.
pub struct ApiClient<T: HttpTransport = ReqwestTransport> {
    transport: Arc<T>,
    base_url: String,
    session: SessionStore,
}

impl<T: HttpTransport> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            base_url: self.base_url.clone(),
            session: self.session.clone(),
        }
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionStore, timeout: Duration) -> Result<Self> {
        let transport = ReqwestTransport::new(timeout)?;
        Ok(Self::with_transport(transport, base_url, session))
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn with_transport(transport: T, base_url: impl Into<String>, session: SessionStore) -> Self {
        Self {
            transport: Arc::new(transport),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<Value>,
        auth_required: bool,
    ) -> Result<Value, ApiError> {
        let bearer = if auth_required {
            self.session.token()
        } else {
            None
        };

        let request = HttpRequest {
            method,
            url: self.url(path),
            bearer: bearer.clone(),
            body,
        };

        let response = self.transport.send(request).await.map_err(|e| {
            warn!("{} {} failed: {}", method.as_str(), path, e);
            e
        })?;
        debug!("{} {} -> {}", method.as_str(), path, response.status);

        if response.is_success() {
            if response.body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&response.body)
                .map_err(|e| ApiError::Network(format!("malformed response body: {e}")));
        }

        let error = ApiError::from_status(response.status, &response.body);
        if let (true, Some(sent)) = (error.is_auth(), bearer.as_deref()) {
            warn!(
                "{} {} rejected with {}, invalidating session",
                method.as_str(),
                path,
                response.status
            );
            if let Err(e) = self.session.invalidate_if(sent).await {
                warn!("Failed to clear stored token: {:#}", e);
            }
        }
        Err(error)
    }

    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let value = self.request(path, Method::Get, None, true).await?;
        decode(value)
    }

    pub async fn send_json<B, R>(
        &self,
        path: &str,
        method: Method,
        body: Option<&B>,
        auth_required: bool,
    ) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ApiError::Network(format!("failed to encode request body: {e}")))?;
        let value = self.request(path, method, body, auth_required).await?;
        decode(value)
    }
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Network(format!("unexpected response shape: {e}")))
}

#[cfg(test)]
pub(crate) mod mock {
    use super::super::transport::HttpResponse;
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records every request and answers from a per-route script.
    ///
    /// Routes are matched on `"<METHOD> <path>"` with the base URL stripped.
    /// Unscripted routes answer 404.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        routes: Arc<Mutex<Vec<(String, VecDeque<Result<HttpResponse, ApiError>>)>>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, route: &str, status: u16, body: &str) -> &Self {
            self.push(
                route,
                Ok(HttpResponse {
                    status,
                    body: body.to_string(),
                }),
            );
            self
        }

        pub fn respond_json(&self, route: &str, status: u16, body: serde_json::Value) -> &Self {
            self.respond(route, status, &body.to_string())
        }

        pub fn fail(&self, route: &str) -> &Self {
            self.push(route, Err(ApiError::Network("connection refused".to_string())));
            self
        }

        fn push(&self, route: &str, answer: Result<HttpResponse, ApiError>) {
            let mut routes = self.routes.lock().unwrap();
            match routes.iter_mut().find(|(r, _)| r == route) {
                Some((_, answers)) => answers.push_back(answer),
                None => routes.push((route.to_string(), VecDeque::from([answer]))),
            }
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// `"<METHOD> <path>"` for every request issued so far.
        pub fn routes(&self) -> Vec<String> {
            self.requests().iter().map(route_of).collect()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    pub fn route_of(request: &HttpRequest) -> String {
        let path = request
            .url
            .strip_prefix(TEST_BASE)
            .unwrap_or(&request.url)
            .to_string();
        format!("{} {}", request.method.as_str(), path)
    }

    pub const TEST_BASE: &str = "http://backend.test/api";

    #[async_trait::async_trait]
    impl HttpTransport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            let route = route_of(&request);
            self.requests.lock().unwrap().push(request);

            let mut routes = self.routes.lock().unwrap();
            let answers = routes.iter_mut().find(|(r, _)| *r == route);
            match answers {
                Some((_, answers)) if answers.len() > 1 => answers.pop_front().unwrap(),
                Some((_, answers)) => answers.front().cloned().unwrap(),
                None => Ok(HttpResponse {
                    status: 404,
                    body: String::new(),
                }),
            }
        }
    }

    /// Wraps a [`MockTransport`] and holds back the first answer until released.
    ///
    /// The held request is recorded and scripted immediately, so later requests
    /// can overtake it.
    #[derive(Clone)]
    pub struct GatedTransport {
        inner: MockTransport,
        gate: Arc<Mutex<Option<tokio::sync::oneshot::Receiver<()>>>>,
    }

    impl GatedTransport {
        pub fn new(inner: MockTransport) -> (Self, tokio::sync::oneshot::Sender<()>) {
            let (tx, rx) = tokio::sync::oneshot::channel();
            let transport = Self {
                inner,
                gate: Arc::new(Mutex::new(Some(rx))),
            };
            (transport, tx)
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for GatedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            let answer = self.inner.send(request).await;
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            answer
        }
    }

    /// Yields until the mock has seen `count` requests.
    pub async fn wait_for_requests(mock: &MockTransport, count: usize) {
        while mock.request_count() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{wait_for_requests, GatedTransport, MockTransport, TEST_BASE};
    use super::*;
    use crate::models::{AuthState, User};
    use crate::session::test_support::{authenticated_session, empty_session};
    use serde_json::json;

    #[tokio::test]
    async fn request_returns_parsed_json_on_success() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond("GET /tasks", 200, r#"[{"id":"1","title":"a","completed":false}]"#);
        let api = ApiClient::with_transport(mock.clone(), TEST_BASE, session);

        let value = api.request("/tasks", Method::Get, None, true).await.unwrap();

        assert_eq!(value[0]["title"], "a");
    }

    #[tokio::test]
    async fn request_attaches_bearer_only_when_auth_required() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond("GET /tasks", 200, "[]");
        mock.respond("POST /auth/login", 200, "{}");
        let api = ApiClient::with_transport(mock.clone(), TEST_BASE, session);

        api.request("/tasks", Method::Get, None, true).await.unwrap();
        api.request("/auth/login", Method::Post, Some(json!({})), false)
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].bearer.as_deref(), Some("t1"));
        assert_eq!(requests[1].bearer, None);
    }

    #[tokio::test]
    async fn request_omits_bearer_when_no_token_held() {
        let (session, _temp) = empty_session().await;
        let mock = MockTransport::new();
        mock.respond("GET /tasks", 401, "");
        let api = ApiClient::with_transport(mock.clone(), TEST_BASE, session);

        let _ = api.request("/tasks", Method::Get, None, true).await;

        assert_eq!(mock.requests()[0].bearer, None);
    }

    #[tokio::test]
    async fn request_treats_empty_success_body_as_null() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond("DELETE /tasks/1", 204, "");
        let api = ApiClient::with_transport(mock.clone(), TEST_BASE, session);

        let value = api
            .request("/tasks/1", Method::Delete, None, true)
            .await
            .unwrap();

        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn request_maps_malformed_body_to_network_error() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond("GET /tasks", 200, "not json");
        let api = ApiClient::with_transport(mock.clone(), TEST_BASE, session);

        let err = api.request("/tasks", Method::Get, None, true).await.unwrap_err();

        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn request_invalidates_session_on_unauthorized() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond("GET /tasks", 401, "");
        let api = ApiClient::with_transport(mock.clone(), TEST_BASE, session.clone());

        let err = api.request("/tasks", Method::Get, None, true).await.unwrap_err();

        assert!(err.is_auth());
        assert_eq!(session.auth_state(), AuthState::Unauthenticated);
        assert!(session.token().is_none());
        assert!(!session.token_store().exists());
    }

    #[tokio::test]
    async fn late_rejection_of_replaced_token_keeps_new_session() {
        let (session, _temp) = authenticated_session("old").await;
        let mock = MockTransport::new();
        mock.respond("GET /tasks", 401, "");
        let (gated, release) = GatedTransport::new(mock.clone());
        let api = ApiClient::with_transport(gated, TEST_BASE, session.clone());

        let pending = tokio::spawn({
            let api = api.clone();
            async move { api.request("/tasks", Method::Get, None, true).await }
        });
        wait_for_requests(&mock, 1).await;

        session.invalidate().await.unwrap();
        session
            .establish("new".to_string(), User::new("u1", "a@b.com"))
            .await
            .unwrap();
        release.send(()).unwrap();

        let err = pending.await.unwrap().unwrap_err();
        assert!(err.is_auth());
        assert_eq!(mock.requests()[0].bearer.as_deref(), Some("old"));
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("new"));
        assert_eq!(
            session.token_store().load().await.unwrap(),
            Some("new".to_string())
        );
    }

    #[tokio::test]
    async fn unauthenticated_call_rejection_keeps_session() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond("POST /auth/login", 401, "Invalid email or password");
        let api = ApiClient::with_transport(mock.clone(), TEST_BASE, session.clone());

        let err = api
            .request("/auth/login", Method::Post, Some(json!({})), false)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid email or password");
        assert_eq!(session.auth_state(), AuthState::Authenticated);
    }

    #[tokio::test]
    async fn request_maps_other_statuses_to_api_error() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond_json("POST /tasks", 422, json!({"message": "title too long"}));
        let api = ApiClient::with_transport(mock.clone(), TEST_BASE, session.clone());

        let err = api
            .request("/tasks", Method::Post, Some(json!({"title": "x"})), true)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::Api {
                status: 422,
                message: "title too long".to_string()
            }
        );
        assert_eq!(session.auth_state(), AuthState::Authenticated);
    }

    #[tokio::test]
    async fn send_json_encodes_body_and_decodes_reply() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond_json("POST /ai/chat", 200, json!({"response": "hi"}));
        let api = ApiClient::with_transport(mock.clone(), TEST_BASE, session);

        let reply: crate::models::ChatReply = api
            .send_json(
                "/ai/chat",
                Method::Post,
                Some(&crate::models::ChatRequest { message: "hello" }),
                true,
            )
            .await
            .unwrap();

        assert_eq!(reply.response, "hi");
        assert_eq!(mock.requests()[0].body, Some(json!({"message": "hello"})));
    }

    #[tokio::test]
    async fn get_json_rejects_unexpected_shape() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond("GET /tasks", 200, r#"{"not":"a list"}"#);
        let api = ApiClient::with_transport(mock.clone(), TEST_BASE, session);

        let result: Result<Vec<crate::models::Task>, ApiError> = api.get_json("/tasks").await;

        assert!(matches!(result, Err(ApiError::Network(_))));
    }

    #[test]
    fn url_joins_base_and_path() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (session, _temp) = rt.block_on(empty_session());
        let api = ApiClient::with_transport(MockTransport::new(), "http://h/api/", session);
        assert_eq!(api.url("/tasks"), "http://h/api/tasks");
        assert_eq!(api.url("tasks/1"), "http://h/api/tasks/1");
    }
}
