use std::net::SocketAddr;

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ledgerly::{
    AppState, DEFAULT_ACCESS_TOKEN_LIFETIME, DEFAULT_REFRESH_TOKEN_LIFETIME, JwtConfig,
    PaginationConfig, build_router, graceful_shutdown,
};

/// The REST API server for ledgerly.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH")]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// The secret used to sign access tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// How long access tokens are valid for, in seconds.
    #[arg(long, env = "JWT_EXPIRATION_SECONDS", default_value_t = DEFAULT_ACCESS_TOKEN_LIFETIME.whole_seconds())]
    jwt_expiration_seconds: i64,

    /// The secret used to sign refresh tokens.
    #[arg(long, env = "JWT_REFRESH_SECRET", hide_env_values = true)]
    jwt_refresh_secret: String,

    /// How long refresh tokens are valid for, in seconds.
    #[arg(long, env = "JWT_REFRESH_EXPIRATION_SECONDS", default_value_t = DEFAULT_REFRESH_TOKEN_LIFETIME.whole_seconds())]
    jwt_refresh_expiration_seconds: i64,

    /// The number of items per page when a request does not specify a size.
    #[arg(long, env = "DEFAULT_PAGE_SIZE", default_value_t = 10)]
    default_page_size: u64,

    /// The largest page size a request may ask for.
    #[arg(long, env = "MAX_PAGE_SIZE", default_value_t = 100)]
    max_page_size: u64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    if args.jwt_expiration_seconds <= 0 || args.jwt_refresh_expiration_seconds <= 0 {
        tracing::error!("Token lifetimes must be a positive number of seconds.");
        std::process::exit(1);
    }

    let pagination_config = PaginationConfig::new(args.default_page_size, args.max_page_size)
        .unwrap_or_else(|error| {
            tracing::error!("Invalid page size settings: {error}");
            std::process::exit(1);
        });

    let jwt_config = JwtConfig::new(
        &args.jwt_secret,
        Duration::seconds(args.jwt_expiration_seconds),
        &args.jwt_refresh_secret,
        Duration::seconds(args.jwt_refresh_expiration_seconds),
    );

    let conn = Connection::open(&args.db_path).unwrap_or_else(|error| {
        tracing::error!("Could not open database file {}: {error}", args.db_path);
        std::process::exit(1);
    });

    let state = AppState::new(conn, jwt_config, pagination_config).unwrap_or_else(|error| {
        tracing::error!("Could not initialize the database: {error}");
        std::process::exit(1);
    });

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        std::process::exit(1);
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
