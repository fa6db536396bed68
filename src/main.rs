mod core;
mod features;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::inquiries::{
    routes as inquiries_routes, GeocodeDispatcher, GeocodeWorker, InquiryService,
    PgInquiryRepository,
};
use crate::features::locations::{
    routes as locations_routes, GeocodingService, LocationService, NominatimClient,
    PgLocationRepository,
};
use axum::Router;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Geocoding provider
    let nominatim = NominatimClient::new(&config.geocoder)
        .map_err(|e| anyhow::anyhow!("Failed to build geocoder HTTP client: {}", e))?;
    let geocoding_service = Arc::new(GeocodingService::new(Arc::new(nominatim)));
    tracing::info!(
        "Geocoder initialized: base_url={}, timeout={:?}",
        config.geocoder.base_url,
        config.geocoder.timeout
    );

    let location_service = Arc::new(LocationService::new(
        Arc::new(PgLocationRepository::new(pool.clone())),
        Arc::clone(&geocoding_service),
    ));
    tracing::info!("Location service initialized");

    // Deferred mode moves geocoding off the request path
    let (dispatcher, geocode_rx) = if config.geocoder.deferred {
        let (dispatcher, rx) = GeocodeDispatcher::channel(config.geocoder.queue_capacity);
        (Some(dispatcher), Some(rx))
    } else {
        (None, None)
    };

    let inquiry_service = Arc::new(InquiryService::new(
        Arc::new(PgInquiryRepository::new(pool.clone())),
        Arc::clone(&location_service),
        dispatcher,
    ));
    tracing::info!("Inquiry service initialized");

    if let Some(rx) = geocode_rx {
        let worker = GeocodeWorker::new(
            rx,
            Arc::clone(&location_service),
            Arc::clone(&inquiry_service),
        );
        tokio::spawn(worker.run());
        tracing::info!(
            "Geocode worker spawned (queue capacity {})",
            config.geocoder.queue_capacity
        );
    } else {
        tracing::info!("Geocoding runs inline with inquiry requests");
    }

    // Build swagger router with configured document info
    let mut openapi = ApiDoc::openapi();
    SwaggerInfoModifier::from(&config.swagger).modify(&mut openapi);
    let swagger =
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(locations_routes::routes(location_service))
        .merge(inquiries_routes::routes(inquiry_service))
        .merge(health_route)
        .layer(RequestBodyLimitLayer::new(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let listener = bind_listener(&addr)?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// TCP listener tuned through socket2
fn bind_listener(addr: &str) -> anyhow::Result<tokio::net::TcpListener> {
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}
