//! ToDo リソースの HTTP API（axum）
//!
//! `/health` 以外のルートは `Config::api_prefix` 配下にネストされ、
//! すべて Bearer トークンによる認証が必要です。

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use domain::{InMemoryTodoRepository, TodoRepository};
use shared::{Config, JwtValidator};
use std::{sync::Arc, time::Instant};

pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;

/// アプリケーションの共有状態
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoRepository>,
    pub validator: JwtValidator,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoRepository>, config: Config) -> Self {
        Self {
            store,
            validator: JwtValidator::new(&config.jwt_secret),
            config: Arc::new(config),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryTodoRepository::new()), Config::default())
    }
}

/// InMemory ストアでルータを構築
pub fn app() -> Router {
    app_with_state(AppState::default())
}

/// 外部から状態を注入できる版
pub fn app_with_state(state: AppState) -> Router {
    let todos = Router::new()
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/:id",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        );

    let api = match state.config.api_prefix.as_str() {
        "" => todos,
        prefix => Router::new().nest(prefix, todos),
    };

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled"
    );
    response
}
