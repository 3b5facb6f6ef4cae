use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagila_api::{
    config::Config,
    db,
    services::{
        ai::AiService, auth::AuthService, customers::PgCustomerStore, token::TokenCodec,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagila_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let codec = Arc::new(TokenCodec::from_config(&config));
    info!(ttl_seconds = codec.ttl_seconds(), "Access token codec ready");
    let store = Arc::new(PgCustomerStore::new(pool.clone()));
    let auth = AuthService::new(codec, store);

    let ai = Arc::new(AiService::new(&config));
    if ai.is_configured() {
        info!("Azure OpenAI client configured");
    } else {
        info!("Azure OpenAI not configured, AI endpoints will return 503");
    }

    let state = AppState {
        db: pool,
        config: config.clone(),
        auth,
        ai,
    };

    let app = pagila_api::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("{} listening on {}", config.app_name, addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
