use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use models::{db, Cocktail, Recipe};
use service::record::{MongoRepository, RecordService};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Connect the store, make sure the slug indexes exist and wire one
/// MongoDB-backed service per collection.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let database = db::connect(&cfg.database).await?;
    db::ensure_indexes::<Cocktail>(&database).await?;
    db::ensure_indexes::<Recipe>(&database).await?;

    Ok(ServerState {
        cocktails: Arc::new(RecordService::<Cocktail>::new(Arc::new(MongoRepository::<Cocktail>::new(&database)))),
        recipes: Arc::new(RecordService::<Recipe>::new(Arc::new(MongoRepository::<Recipe>::new(&database)))),
        public_url: cfg.server.public_url.as_deref().map(Arc::from),
    })
}

/// Public entry: build the app and serve until `shutdown` resolves.
/// In-flight requests are drained before returning.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    // Validate the address before touching the database
    let addr = bind_addr(&cfg)?;
    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state, build_cors());

    info!(%addr, "starting recipe api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("http server drained");
    Ok(())
}
