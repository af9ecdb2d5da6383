use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use quiz_admin_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::{auth, cors, rate_limit},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let login_api = Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.login_rps),
            rate_limit::rps_middleware,
        ));

    let bearer_api = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn(auth::require_bearer_auth));

    let admin_api = Router::new()
        .route(
            "/api/users/:user_id/quizzes",
            get(routes::assignments::list_user_quizzes),
        )
        .route(
            "/api/quizzes/:quiz_id/links",
            get(routes::quizzes::get_quiz_links),
        )
        .layer(axum::middleware::from_fn(auth::require_admin));

    let superadmin_api = Router::new()
        .route(
            "/api/user-quiz-assignments",
            get(routes::assignments::list_assignments)
                .post(routes::assignments::create_assignment),
        )
        .route(
            "/api/user-quiz-assignments/:id",
            axum::routing::patch(routes::assignments::update_assignment)
                .delete(routes::assignments::delete_assignment),
        )
        .route(
            "/api/quizzes/:quiz_id/users",
            get(routes::assignments::list_quiz_users),
        )
        .route(
            "/api/quizzes/:quiz_id/image",
            post(routes::quizzes::upload_quiz_image),
        )
        .layer(axum::middleware::from_fn(auth::require_superadmin));

    let uploads_dir = config.uploads_dir.clone();
    info!("Serving uploads from: {}", uploads_dir);

    let app = base_routes
        .merge(login_api)
        .merge(bearer_api)
        .merge(admin_api)
        .merge(superadmin_api)
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(uploads_dir),
        )
        .with_state(app_state)
        .layer(cors::permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
