//! HTTP 应用组装
//!
//! 路由 + 中间件栈：
//!
//! ```text
//! log_request → CORS → gzip → body limit → [require_session] → handlers
//! ```

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderValue, Method};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::auth::require_session;
use crate::core::{Config, ServerState};

/// Multipart framing on top of the image itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
///
/// 实体 CRUD 路由在 `REQUIRE_SESSION=true` 时经过会话门控；
/// 登录、登出、check-session 与 health 始终公开。
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let mut entities = Router::<ServerState>::new()
        .merge(crate::api::role::router())
        .merge(crate::api::users::router())
        .merge(crate::api::admins::router())
        .merge(crate::api::categories::router())
        .merge(crate::api::products::router());

    if state.config.session.require_session {
        entities = entities.route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));
    }

    Router::<ServerState>::new()
        .merge(crate::api::auth::router())
        .merge(crate::api::health::router())
        .merge(entities)
}

/// Single allowed origin with credentials
fn cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT])
        .allow_credentials(true);

    match HeaderValue::from_str(&config.cors_origin) {
        Ok(origin) => base.allow_origin(origin),
        Err(e) => {
            tracing::warn!(origin = %config.cors_origin, error = %e, "Invalid CORS_ORIGIN, cross-origin requests disabled");
            base
        }
    }
}

/// Full application with state and middleware
pub fn build_router(state: ServerState) -> Router {
    let body_limit = state.config.upload.max_bytes + MULTIPART_OVERHEAD;
    let cors = cors_layer(&state.config);

    build_app(&state)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(cors)
        // HTTP 请求日志中间件
        .layer(middleware::from_fn(log_request))
}
