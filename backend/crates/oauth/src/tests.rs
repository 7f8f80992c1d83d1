//! Router-level tests for the OAuth crate
//! Drives authorize -> callback -> token -> protected resource end to end

#[cfg(test)]
mod support {
    use crate::application::config::OAuthConfig;
    use crate::domain::entities::UpstreamTokens;
    use crate::domain::provider::IdentityProvider;
    use crate::error::IdpError;
    use crate::infra::kv::KvOAuthRepository;
    use crate::presentation::router::{oauth_router, protected_router};
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, Response, StatusCode, header};
    use platform::clock::ManualClock;
    use platform::kv::{KvError, KvResult, KvStore, MemoryKvStore};
    use platform::upstream::{Upstream, UpstreamError};
    use reqwest::Url;
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    pub const CLIENT_REDIRECT: &str = "https://client.example/cb";
    pub const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    pub const CHALLENGE: &str = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

    #[derive(Clone, Copy, PartialEq, Eq)]
    pub enum IdpMode {
        Accept,
        Reject,
        Down,
    }

    /// Identity provider double recording what it was asked
    #[derive(Clone)]
    pub struct StubIdp {
        pub mode: Arc<Mutex<IdpMode>>,
        pub calls: Arc<AtomicUsize>,
        pub last_redirect_uri: Arc<Mutex<Option<String>>>,
    }

    impl StubIdp {
        pub fn new(mode: IdpMode) -> Self {
            Self {
                mode: Arc::new(Mutex::new(mode)),
                calls: Arc::new(AtomicUsize::new(0)),
                last_redirect_uri: Arc::new(Mutex::new(None)),
            }
        }

        pub fn set_mode(&self, mode: IdpMode) {
            *self.mode.lock().unwrap() = mode;
        }

        fn answer(&self, prefix: &str) -> Result<UpstreamTokens, IdpError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match *self.mode.lock().unwrap() {
                IdpMode::Accept => Ok(UpstreamTokens {
                    access_token: format!("{prefix}-access"),
                    id_token: Some(format!("{prefix}-id")),
                    refresh_token: Some(format!("{prefix}-refresh")),
                    expires_in: Some(3600),
                }),
                IdpMode::Reject => Err(IdpError::Rejected {
                    status: 400,
                    body: "invalid_grant: code already used".to_string(),
                }),
                IdpMode::Down => Err(IdpError::Transport("connection refused".to_string())),
            }
        }
    }

    impl IdentityProvider for StubIdp {
        async fn exchange_code(
            &self,
            _code: &str,
            redirect_uri: &str,
        ) -> Result<UpstreamTokens, IdpError> {
            *self.last_redirect_uri.lock().unwrap() = Some(redirect_uri.to_string());
            self.answer("up")
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<UpstreamTokens, IdpError> {
            self.answer("refreshed")
        }
    }

    /// Backend echoing the Authorization header it received
    #[derive(Clone, Default)]
    pub struct EchoBackend;

    impl Upstream for EchoBackend {
        async fn forward(&self, req: Request<Body>) -> Result<Response<Body>, UpstreamError> {
            let auth = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            Ok(Response::new(Body::from(format!(
                "{} {} {}",
                req.method(),
                req.uri().path(),
                auth
            ))))
        }
    }

    #[derive(Clone, Copy, PartialEq, Eq)]
    pub enum KvOp {
        Get,
        Put,
        /// Also covers `take`
        Delete,
    }

    /// In-memory store that fails chosen operations on chosen key prefixes
    #[derive(Clone)]
    pub struct FlakyKv {
        inner: MemoryKvStore,
        failing: Arc<Mutex<Vec<(KvOp, &'static str)>>>,
        pub written: Arc<Mutex<Vec<String>>>,
    }

    impl FlakyKv {
        fn new(inner: MemoryKvStore) -> Self {
            Self {
                inner,
                failing: Arc::new(Mutex::new(Vec::new())),
                written: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn fail(&self, op: KvOp, prefix: &'static str) {
            self.failing.lock().unwrap().push((op, prefix));
        }

        pub fn heal(&self) {
            self.failing.lock().unwrap().clear();
        }

        pub fn wrote_with_prefix(&self, prefix: &str) -> bool {
            self.written.lock().unwrap().iter().any(|k| k.starts_with(prefix))
        }

        fn check(&self, op: KvOp, key: &str) -> KvResult<()> {
            let failing = self.failing.lock().unwrap();
            if failing.iter().any(|(o, p)| *o == op && key.starts_with(p)) {
                return Err(KvError::Backend("kv unavailable".to_string()));
            }
            Ok(())
        }
    }

    impl KvStore for FlakyKv {
        async fn get(&self, key: &str) -> KvResult<Option<String>> {
            self.check(KvOp::Get, key)?;
            KvStore::get(&self.inner, key).await
        }

        async fn put(&self, key: &str, value: String, ttl: Duration) -> KvResult<()> {
            self.check(KvOp::Put, key)?;
            self.written.lock().unwrap().push(key.to_string());
            KvStore::put(&self.inner, key, value, ttl).await
        }

        async fn delete(&self, key: &str) -> KvResult<()> {
            self.check(KvOp::Delete, key)?;
            KvStore::delete(&self.inner, key).await
        }

        async fn take(&self, key: &str) -> KvResult<Option<String>> {
            self.check(KvOp::Delete, key)?;
            KvStore::take(&self.inner, key).await
        }
    }

    pub struct Harness {
        pub router: Router,
        pub idp: StubIdp,
        pub clock: Arc<ManualClock>,
        pub store: FlakyKv,
    }

    pub fn harness(mode: IdpMode) -> Harness {
        let clock = ManualClock::new(1_700_000_000_000);
        let store = FlakyKv::new(MemoryKvStore::new(clock.clone()));
        let repo = KvOAuthRepository::new(store.clone());
        let idp = StubIdp::new(mode);
        let config = OAuthConfig::new(
            "idp-client",
            "idp-secret",
            "https://idp.test/authorize",
            "https://idp.test/token",
        );

        let router = Router::new()
            .merge(oauth_router(repo.clone(), idp.clone(), config.clone(), clock.clone()))
            .merge(protected_router(repo, EchoBackend, config));

        Harness {
            router,
            idp,
            clock,
            store,
        }
    }

    pub async fn get(router: &Router, uri: &str) -> Response<Body> {
        let req = Request::builder()
            .uri(uri)
            .header(header::HOST, "edge.test")
            .body(Body::empty())
            .unwrap();
        router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get_with_bearer(router: &Router, uri: &str, authorization: &str) -> Response<Body> {
        let req = Request::builder()
            .uri(uri)
            .header(header::HOST, "edge.test")
            .header(header::AUTHORIZATION, authorization)
            .body(Body::empty())
            .unwrap();
        router.clone().oneshot(req).await.unwrap()
    }

    pub async fn post_form(router: &Router, uri: &str, body: &str) -> Response<Body> {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::HOST, "edge.test")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        router.clone().oneshot(req).await.unwrap()
    }

    pub fn location(response: &Response<Body>) -> Url {
        let raw = response.headers()[header::LOCATION].to_str().unwrap();
        Url::parse(raw).unwrap()
    }

    pub fn query_param(url: &Url, name: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    pub async fn json(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub async fn text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Run authorize + callback and return the client code
    pub async fn obtain_code(router: &Router, state: &str, with_pkce: bool) -> String {
        let mut uri = format!(
            "/authorize?client_id=mcp-client&redirect_uri={CLIENT_REDIRECT}&state={state}"
        );
        if with_pkce {
            uri.push_str(&format!("&code_challenge={CHALLENGE}&code_challenge_method=S256"));
        }
        let authorize = get(router, &uri).await;
        assert_eq!(authorize.status(), StatusCode::FOUND);

        let callback = get(router, &format!("/callback?code=provider-code&state={state}")).await;
        assert_eq!(callback.status(), StatusCode::FOUND);
        query_param(&location(&callback), "code").unwrap()
    }

    pub fn redeem_body(code: &str, verifier: Option<&str>) -> String {
        let mut body = format!(
            "grant_type=authorization_code&code={code}&redirect_uri={CLIENT_REDIRECT}&client_id=mcp-client"
        );
        if let Some(v) = verifier {
            body.push_str(&format!("&code_verifier={v}"));
        }
        body
    }
}

#[cfg(test)]
mod authorize_tests {
    use super::support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_authorize_redirects_to_provider() {
        let h = harness(IdpMode::Accept);

        let response = get(
            &h.router,
            "/authorize?client_id=mcp-client&redirect_uri=https://client.example/cb&state=abc",
        )
        .await;
        assert_eq!(response.status(), StatusCode::FOUND);

        let url = location(&response);
        assert_eq!(url.host_str(), Some("idp.test"));
        assert_eq!(url.path(), "/authorize");
        assert_eq!(query_param(&url, "client_id").as_deref(), Some("idp-client"));
        assert_eq!(
            query_param(&url, "redirect_uri").as_deref(),
            Some("http://edge.test/callback")
        );
        assert_eq!(query_param(&url, "response_type").as_deref(), Some("code"));
        assert_eq!(
            query_param(&url, "scope").as_deref(),
            Some("openid profile email")
        );
        assert_eq!(query_param(&url, "state").as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_authorize_keeps_requested_scope() {
        let h = harness(IdpMode::Accept);

        let response = get(
            &h.router,
            "/authorize?client_id=c&redirect_uri=https://client.example/cb&state=s&scope=openid",
        )
        .await;
        assert_eq!(query_param(&location(&response), "scope").as_deref(), Some("openid"));
    }

    #[tokio::test]
    async fn test_authorize_missing_parameters() {
        let h = harness(IdpMode::Accept);

        for uri in [
            "/authorize?redirect_uri=https://client.example/cb&state=s",
            "/authorize?client_id=c&state=s",
            "/authorize?client_id=c&redirect_uri=https://client.example/cb",
            "/authorize?client_id=c&redirect_uri=https://client.example/cb&state=",
        ] {
            let response = get(&h.router, uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(json(response).await["error"], "invalid_request");
        }
    }

    #[tokio::test]
    async fn test_malformed_query_is_oauth_error() {
        let h = harness(IdpMode::Accept);

        for uri in [
            "/authorize?client_id=a&client_id=b&redirect_uri=https://client.example/cb&state=s",
            "/callback?code=x&state=s1&state=s2",
        ] {
            let response = get(&h.router, uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(response.headers()["content-type"], "application/json");
            let body = json(response).await;
            assert_eq!(body["error"], "invalid_request", "{uri}");
            assert!(body["error_description"].as_str().is_some_and(|d| !d.is_empty()));
        }
    }
}

#[cfg(test)]
mod callback_tests {
    use super::support::*;
    use axum::http::StatusCode;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[tokio::test]
    async fn test_callback_issues_code_and_consumes_state() {
        let h = harness(IdpMode::Accept);
        get(
            &h.router,
            "/authorize?client_id=c&redirect_uri=https://client.example/cb&state=st1",
        )
        .await;

        let response = get(&h.router, "/callback?code=provider-code&state=st1").await;
        assert_eq!(response.status(), StatusCode::FOUND);

        let url = location(&response);
        assert_eq!(url.host_str(), Some("client.example"));
        assert_eq!(url.path(), "/cb");
        assert_eq!(query_param(&url, "state").as_deref(), Some("st1"));
        assert!(query_param(&url, "code").is_some());
        assert_eq!(
            h.idp.last_redirect_uri.lock().unwrap().as_deref(),
            Some("http://edge.test/callback")
        );

        // The parked request is single-use
        let replay = get(&h.router, "/callback?code=provider-code&state=st1").await;
        assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(replay).await["error"], "invalid_grant");
    }

    #[tokio::test]
    async fn test_callback_state_cleanup_failure_mints_no_code() {
        let h = harness(IdpMode::Accept);
        get(
            &h.router,
            "/authorize?client_id=c&redirect_uri=https://client.example/cb&state=st2",
        )
        .await;

        h.store.fail(KvOp::Delete, "oauth_request:");
        let response = get(&h.router, "/callback?code=provider-code&state=st2").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json(response).await["error"], "server_error");
        assert!(!h.store.wrote_with_prefix("auth_code:"));
    }

    #[tokio::test]
    async fn test_callback_unknown_or_expired_state() {
        let h = harness(IdpMode::Accept);

        let unknown = get(&h.router, "/callback?code=x&state=never-issued").await;
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(unknown).await["error"], "invalid_grant");

        get(
            &h.router,
            "/authorize?client_id=c&redirect_uri=https://client.example/cb&state=old",
        )
        .await;
        h.clock.advance(Duration::from_secs(600));
        let expired = get(&h.router, "/callback?code=x&state=old").await;
        assert_eq!(expired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(expired).await["error"], "invalid_grant");

        assert_eq!(h.idp.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_callback_missing_parameters() {
        let h = harness(IdpMode::Accept);

        let response = get(&h.router, "/callback?state=s").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "invalid_request");
    }

    #[tokio::test]
    async fn test_callback_provider_failure_is_server_error() {
        let h = harness(IdpMode::Reject);
        get(
            &h.router,
            "/authorize?client_id=c&redirect_uri=https://client.example/cb&state=s",
        )
        .await;

        let response = get(&h.router, "/callback?code=provider-code&state=s").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json(response).await;
        assert_eq!(body["error"], "server_error");
        assert!(
            body["error_description"]
                .as_str()
                .unwrap()
                .contains("code already used")
        );
    }
}

#[cfg(test)]
mod token_tests {
    use super::support::*;
    use axum::http::StatusCode;
    use std::time::Duration;

    #[tokio::test]
    async fn test_pkce_round_trip_succeeds_once() {
        let h = harness(IdpMode::Accept);
        let code = obtain_code(&h.router, "pkce-1", true).await;

        let response = post_form(&h.router, "/token", &redeem_body(&code, Some(VERIFIER))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["cache-control"], "no-store");

        let body = json(response).await;
        assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["expires_in"], 3600);
        assert_eq!(body["refresh_token"], "up-refresh");

        let replay = post_form(&h.router, "/token", &redeem_body(&code, Some(VERIFIER))).await;
        assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(replay).await["error"], "invalid_grant");
    }

    #[tokio::test]
    async fn test_pkce_mismatch_is_invalid_grant() {
        let h = harness(IdpMode::Accept);
        let code = obtain_code(&h.router, "pkce-2", true).await;

        let wrong = post_form(
            &h.router,
            "/token",
            &redeem_body(&code, Some("not-the-right-verifier")),
        )
        .await;
        assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);
        let body = json(wrong).await;
        assert_eq!(body["error"], "invalid_grant");
        assert_eq!(body["error_description"], "Invalid code verifier");

        // A failed verifier does not burn the code
        let right = post_form(&h.router, "/token", &redeem_body(&code, Some(VERIFIER))).await;
        assert_eq!(right.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_restored_code_keeps_its_expiry() {
        let h = harness(IdpMode::Accept);
        let code = obtain_code(&h.router, "pkce-3", true).await;

        h.clock.advance(Duration::from_secs(200));
        let wrong = post_form(&h.router, "/token", &redeem_body(&code, Some("wrong"))).await;
        assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);

        h.clock.advance(Duration::from_secs(100));
        let late = post_form(&h.router, "/token", &redeem_body(&code, Some(VERIFIER))).await;
        assert_eq!(late.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(late).await["error"], "invalid_grant");
    }

    #[tokio::test]
    async fn test_code_is_spent_before_token_is_stored() {
        let h = harness(IdpMode::Accept);
        let code = obtain_code(&h.router, "spent", true).await;

        h.store.fail(KvOp::Put, "access_token:");
        let failed = post_form(&h.router, "/token", &redeem_body(&code, Some(VERIFIER))).await;
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json(failed).await["error"], "server_error");

        h.store.heal();
        let retry = post_form(&h.router, "/token", &redeem_body(&code, Some(VERIFIER))).await;
        assert_eq!(retry.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(retry).await["error"], "invalid_grant");
    }

    #[tokio::test]
    async fn test_concurrent_redemptions_issue_one_token() {
        let h = harness(IdpMode::Accept);
        let code = obtain_code(&h.router, "race", false).await;
        let body = redeem_body(&code, None);

        let (a, b) = tokio::join!(
            post_form(&h.router, "/token", &body),
            post_form(&h.router, "/token", &body)
        );
        let mut statuses = [a.status(), b.status()];
        statuses.sort();
        assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);
    }

    #[tokio::test]
    async fn test_code_without_challenge_needs_no_verifier() {
        let h = harness(IdpMode::Accept);
        let code = obtain_code(&h.router, "plain", false).await;

        let response = post_form(&h.router, "/token", &redeem_body(&code, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_and_expired_codes() {
        let h = harness(IdpMode::Accept);

        let unknown = post_form(&h.router, "/token", &redeem_body("forged", None)).await;
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(unknown).await["error"], "invalid_grant");

        let code = obtain_code(&h.router, "slow", true).await;
        h.clock.advance(Duration::from_secs(300));
        let expired = post_form(&h.router, "/token", &redeem_body(&code, Some(VERIFIER))).await;
        assert_eq!(expired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(expired).await["error"], "invalid_grant");
    }

    #[tokio::test]
    async fn test_token_request_validation() {
        let h = harness(IdpMode::Accept);

        let missing = post_form(&h.router, "/token", "grant_type=authorization_code&code=x").await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(missing).await["error"], "invalid_request");

        let unsupported = post_form(&h.router, "/token", "grant_type=password").await;
        assert_eq!(unsupported.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(unsupported).await["error"], "unsupported_grant_type");

        let no_grant = post_form(&h.router, "/token", "").await;
        assert_eq!(json(no_grant).await["error"], "unsupported_grant_type");

        let get_token = get(&h.router, "/token").await;
        assert_eq!(get_token.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_refresh_grant() {
        let h = harness(IdpMode::Accept);

        let missing = post_form(&h.router, "/token", "grant_type=refresh_token").await;
        assert_eq!(json(missing).await["error"], "invalid_request");

        let ok = post_form(
            &h.router,
            "/token",
            "grant_type=refresh_token&refresh_token=r1&client_id=mcp-client",
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);
        let body = json(ok).await;
        assert_eq!(body["refresh_token"], "refreshed-refresh");

        let token = body["access_token"].as_str().unwrap().to_string();
        let resource =
            get_with_bearer(&h.router, "/mcp", &format!("Bearer {token}")).await;
        assert_eq!(text(resource).await, "GET /mcp Bearer refreshed-access");

        h.idp.set_mode(IdpMode::Reject);
        let rejected = post_form(&h.router, "/token", "grant_type=refresh_token&refresh_token=r1").await;
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(rejected).await["error"], "invalid_grant");

        h.idp.set_mode(IdpMode::Down);
        let down = post_form(&h.router, "/token", "grant_type=refresh_token&refresh_token=r1").await;
        assert_eq!(down.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#[cfg(test)]
mod protected_tests {
    use super::support::*;
    use axum::http::{StatusCode, header};
    use std::time::Duration;

    #[tokio::test]
    async fn test_protected_requires_bearer() {
        let h = harness(IdpMode::Accept);

        for path in ["/mcp", "/mcp/sse", "/sse"] {
            let response = get(&h.router, path).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                response.headers()[header::WWW_AUTHENTICATE],
                r#"Bearer realm="MCP Server", authorization_url="http://edge.test/authorize""#
            );
            let body = json(response).await;
            assert_eq!(body["error"], "unauthorized");
            assert_eq!(body["authorization_url"], "http://edge.test/authorize");
        }

        for credential in ["Bearer unknown-token", "Basic dXNlcjpwYXNz", "bearer x"] {
            let response = get_with_bearer(&h.router, "/mcp", credential).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{credential}");
        }
    }

    #[tokio::test]
    async fn test_token_store_failure_is_server_error() {
        let h = harness(IdpMode::Accept);
        h.store.fail(KvOp::Get, "access_token:");

        let response = get_with_bearer(&h.router, "/mcp", "Bearer some-token").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
        let body = json(response).await;
        assert_eq!(body["error"], "server_error");
        assert_eq!(body["error_description"], "Internal error");
    }

    #[tokio::test]
    async fn test_verified_request_reaches_backend_with_provider_token() {
        let h = harness(IdpMode::Accept);
        let code = obtain_code(&h.router, "res", true).await;
        let body = json(post_form(&h.router, "/token", &redeem_body(&code, Some(VERIFIER))).await).await;
        let token = body["access_token"].as_str().unwrap().to_string();

        let response = get_with_bearer(&h.router, "/mcp/sse", &format!("Bearer {token}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "GET /mcp/sse Bearer up-access");

        h.clock.advance(Duration::from_secs(3600));
        let expired = get_with_bearer(&h.router, "/mcp", &format!("Bearer {token}")).await;
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
    }
}
