//! todo-api バイナリのエントリポイント

use anyhow::Context;
use domain::{InMemoryTodoRepository, TodoRepository};
use infrastructure::{DynamoDbClient, DynamoDbTodoRepository};
use shared::{init_tracing, Config, StoreKind};
use std::{net::SocketAddr, sync::Arc};
use todo_api::{app_with_state, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().map_err(|e| anyhow::anyhow!("トレーシング初期化エラー: {e}"))?;

    let config = Config::from_env().context("設定読み込みエラー")?;

    let store: Arc<dyn TodoRepository> = match config.store {
        StoreKind::Memory => {
            warn!("InMemoryストアで起動します（再起動でデータは消えます）");
            Arc::new(InMemoryTodoRepository::new())
        }
        StoreKind::DynamoDb => {
            let db = DynamoDbClient::new(&config).await;
            info!(table = %db.table_name(), "DynamoDBストアで起動します");
            Arc::new(DynamoDbTodoRepository::new(db))
        }
    };

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, environment = %config.environment, "server starting");

    let router = app_with_state(AppState::new(store, config));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "シグナル待機に失敗しました");
    }
}
