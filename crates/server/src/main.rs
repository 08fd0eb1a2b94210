//! Bramble server entry point.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, middleware};
use bramble_api::{middleware::AppState, router as api_router};
use bramble_common::{Config, LocalStorage};
use bramble_core::{
    CommentService, FollowService, ImageService, MailerService, PollService, PostService,
};
use bramble_db::repositories::{
    ChoiceRepository, CommentRepository, FollowRepository, ImageRepository, PostRepository,
    QuestionRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bramble=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting bramble server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = bramble_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    bramble_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let image_repo = ImageRepository::new(Arc::clone(&db));
    let question_repo = QuestionRepository::new(Arc::clone(&db));
    let choice_repo = ChoiceRepository::new(Arc::clone(&db));

    // Initialize file storage
    let storage = Arc::new(LocalStorage::new(
        PathBuf::from(&config.storage.base_path),
        config.storage.base_url.clone(),
    ));

    // Initialize services
    let follow_service = FollowService::new(follow_repo, user_repo.clone());
    let post_service = PostService::new(post_repo.clone());
    let comment_service = CommentService::new(comment_repo, post_repo);
    let image_service = ImageService::new(image_repo, user_repo.clone(), storage);
    let poll_service = PollService::new(question_repo, choice_repo);

    let mailer_service = MailerService::new(config.mail.as_ref())?;
    if mailer_service.is_enabled() {
        info!("Outbound mail enabled");
    } else {
        info!("Outbound mail disabled, share requests will be logged only");
    }

    // Create app state
    let state = AppState {
        follow_service,
        post_service,
        comment_service,
        image_service,
        poll_service,
        mailer_service,
        user_repo,
        base_url: config.server.url.clone(),
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            bramble_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
