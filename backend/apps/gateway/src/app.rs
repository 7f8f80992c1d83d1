//! Router assembly
//!
//! The OAuth endpoints, the protected resource paths and the discovery
//! document are matched first; everything else falls through to the
//! admission router in front of the origin.

use admission::{EdgeAdmissionRepository, admission_router};
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::routing::get;
use axum::{Json, Router};
use oauth::presentation::handlers::request_base_url;
use oauth::{
    HttpIdentityProvider, KvOAuthRepository, OAuthConfig, PROTECTED_PATHS, oauth_router,
    oauth_unavailable_router, protected_router,
};
use platform::cache::MemoryEdgeCache;
use platform::clock::SharedClock;
use platform::kv::KvBinding;
use platform::tasks::BackgroundTasks;
use platform::upstream::Upstream;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::GatewayConfig;

/// Shared infrastructure handed to every router
#[derive(Clone)]
pub struct Infra {
    pub kv: KvBinding,
    pub cache: MemoryEdgeCache,
    pub clock: SharedClock,
    pub tasks: BackgroundTasks,
}

/// Build the full gateway router
pub fn build_app<O, B>(
    config: &GatewayConfig,
    infra: Infra,
    origin: O,
    backend: B,
) -> anyhow::Result<Router>
where
    O: Upstream + Send + Sync + 'static,
    B: Upstream + Send + Sync + 'static,
{
    let oauth_repo = KvOAuthRepository::new(infra.kv.clone());
    let oauth_enabled = config.oauth.is_configured();

    let authorization = if oauth_enabled {
        let provider = HttpIdentityProvider::new(&config.oauth)?;
        oauth_router(
            oauth_repo.clone(),
            provider,
            config.oauth.clone(),
            infra.clock.clone(),
        )
    } else {
        tracing::warn!("OAuth provider settings missing, OAuth endpoints disabled");
        oauth_unavailable_router()
    };

    let discovery = Router::new()
        .route("/.well-known/edge-gateway", get(discovery_document))
        .with_state(Arc::new(DiscoveryState {
            oauth: config.oauth.clone(),
            oauth_enabled,
        }));

    let api = Router::new()
        .merge(authorization)
        .merge(protected_router(oauth_repo, backend, config.oauth.clone()))
        .merge(discovery)
        .layer(cors_layer(&config.frontend_origins));

    let admission = admission_router(
        EdgeAdmissionRepository::new(
            infra.kv,
            infra.cache,
            Arc::new(config.admission.clone()),
        ),
        origin,
        Arc::new(config.admission.clone()),
        infra.clock,
        infra.tasks,
    );

    Ok(api.fallback_service(admission))
}

/// CORS for the OAuth and protected surfaces
///
/// Credentials are only allowed with an explicit allow-list.
pub fn cors_layer(frontend_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    let allowed_origins: Vec<HeaderValue> = frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if allowed_origins.is_empty() {
        cors.allow_origin(AllowOrigin::any())
    } else {
        cors.allow_origin(allowed_origins).allow_credentials(true)
    }
}

struct DiscoveryState {
    oauth: OAuthConfig,
    oauth_enabled: bool,
}

#[derive(Debug, Serialize)]
struct DiscoveryDocument {
    authorization_endpoint: String,
    token_endpoint: String,
    resource_endpoints: Vec<String>,
    oauth_enabled: bool,
}

async fn discovery_document(
    State(state): State<Arc<DiscoveryState>>,
    headers: HeaderMap,
) -> Json<DiscoveryDocument> {
    let base_url = request_base_url(&headers, &state.oauth);

    Json(DiscoveryDocument {
        authorization_endpoint: format!("{base_url}/authorize"),
        token_endpoint: format!("{base_url}/token"),
        resource_endpoints: PROTECTED_PATHS
            .iter()
            .map(|path| format!("{base_url}{path}"))
            .collect(),
        oauth_enabled: state.oauth_enabled,
    })
}

/// Drop expired entries from the in-memory stores
pub fn purge_expired(infra: &Infra) {
    let kv = infra.kv.purge_expired();
    let cache = infra.cache.purge_expired();
    if kv + cache > 0 {
        tracing::debug!(kv, cache, "Purged expired entries");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, Response, StatusCode};
    use platform::clock::ManualClock;
    use platform::kv::KvBindingKind;
    use platform::upstream::UpstreamError;
    use tower::ServiceExt;

    #[derive(Clone)]
    struct Named(&'static str);

    impl Upstream for Named {
        async fn forward(&self, req: Request<Body>) -> Result<Response<Body>, UpstreamError> {
            Ok(Response::new(Body::from(format!("{} {}", self.0, req.uri().path()))))
        }
    }

    fn config(oauth: bool, origins: &[&str]) -> GatewayConfig {
        let mut pairs = vec![
            ("ORIGIN_URL".to_string(), "https://origin.test".to_string()),
            ("BACKEND_API_URL".to_string(), "https://backend.test".to_string()),
            ("FRONTEND_ORIGINS".to_string(), origins.join(",")),
        ];
        if oauth {
            pairs.extend([
                ("ACCESS_CLIENT_ID".to_string(), "id".to_string()),
                ("ACCESS_CLIENT_SECRET".to_string(), "secret".to_string()),
                (
                    "ACCESS_AUTHORIZATION_URL".to_string(),
                    "https://idp.test/authorize".to_string(),
                ),
                ("ACCESS_TOKEN_URL".to_string(), "https://idp.test/token".to_string()),
            ]);
        }
        GatewayConfig::from_lookup(|key| {
            pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    fn app(config: &GatewayConfig) -> Router {
        let clock: SharedClock = ManualClock::new(1_700_000_000_000);
        let infra = Infra {
            kv: KvBinding::from_kind(KvBindingKind::Memory, clock.clone()),
            cache: MemoryEdgeCache::new(clock.clone()),
            clock,
            tasks: BackgroundTasks::new(),
        };
        build_app(config, infra, Named("origin"), Named("backend")).unwrap()
    }

    async fn send(router: &Router, req: Request<Body>) -> Response<Body> {
        router.clone().oneshot(req).await.unwrap()
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_discovery_document() {
        let router = app(&config(true, &[]));
        let req = Request::builder()
            .uri("/.well-known/edge-gateway")
            .header(header::HOST, "edge.test")
            .body(Body::empty())
            .unwrap();

        let body = body_json(send(&router, req).await).await;
        assert_eq!(body["authorization_endpoint"], "http://edge.test/authorize");
        assert_eq!(body["token_endpoint"], "http://edge.test/token");
        assert_eq!(body["resource_endpoints"][0], "http://edge.test/mcp");
        assert_eq!(body["oauth_enabled"], true);
    }

    #[tokio::test]
    async fn test_oauth_disabled_without_provider_settings() {
        let router = app(&config(false, &[]));

        let req = Request::builder().uri("/authorize").body(Body::empty()).unwrap();
        let response = send(&router, req).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["error"], "temporarily_unavailable");

        let req = Request::builder().uri("/mcp").body(Body::empty()).unwrap();
        assert_eq!(send(&router, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unmatched_paths_reach_origin() {
        let router = app(&config(true, &[]));
        let req = Request::builder().uri("/shop/item").body(Body::empty()).unwrap();

        let response = send(&router, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"origin /shop/item");
    }

    #[tokio::test]
    async fn test_cors_preflight_on_protected_path() {
        let router = app(&config(true, &["https://app.test"]));
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/mcp")
            .header(header::ORIGIN, "https://app.test")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = send(&router, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.test"
        );
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
            "true"
        );
    }
}
