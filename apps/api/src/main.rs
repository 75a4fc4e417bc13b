use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use synergyx_api::auth::accounts::PgAccountStore;
use synergyx_api::auth::session::RedisSessionStore;
use synergyx_api::config::Config;
use synergyx_api::db::create_pool;
use synergyx_api::intake::generator::GenerationClient;
use synergyx_api::intake::store::PgProfileStore;
use synergyx_api::routes::build_router;
use synergyx_api::state::AppState;
use synergyx_api::storage::{BlobStore, S3BlobStore};
use synergyx_api::waitlist::repository::PgWaitlistGateway;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast on missing required env vars
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SynergyX API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let blobs: Arc<dyn BlobStore> = Arc::new(S3BlobStore::new(
        s3,
        config.s3_bucket.clone(),
        config.resume_url_ttl,
    ));
    info!(
        "S3 blob store initialized (bucket: {}, url ttl: {}s)",
        config.s3_bucket,
        config.resume_url_ttl.as_secs()
    );

    let generator = GenerationClient::new(
        config.generation_api_url.clone(),
        config.generation_api_key.clone(),
    );
    info!("Generation client initialized");

    let state = AppState {
        waitlist: Arc::new(PgWaitlistGateway::new(db.clone(), blobs.clone())),
        blobs,
        generator: Arc::new(generator),
        profiles: Arc::new(PgProfileStore::new(db.clone())),
        accounts: Arc::new(PgAccountStore::new(db)),
        sessions: Arc::new(RedisSessionStore::new(redis, config.session_ttl)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "synergyx-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
