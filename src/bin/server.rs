use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use spendwise::{
    AppState, DisabledGenerativeService, GenerativeService, GenkitClient, build_router,
    graceful_shutdown,
};

/// The web server for SpendWise.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// Base URL of the Genkit flow server used for budgeting advice and logos.
    ///
    /// Advice and logo generation are disabled when this is not set.
    #[arg(long)]
    genkit_url: Option<String>,

    /// How many seconds to wait for the flow server before giving up.
    #[arg(long, default_value_t = 30)]
    advice_timeout_secs: u64,

    /// How many seconds a transaction write may take before it is reported as failed.
    #[arg(long, default_value_t = 10)]
    submit_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let generative_service: Arc<dyn GenerativeService> = match &args.genkit_url {
        Some(url) => Arc::new(
            GenkitClient::new(url, Duration::from_secs(args.advice_timeout_secs))
                .expect("Could not create the Genkit client"),
        ),
        None => {
            tracing::warn!("No --genkit-url given, budgeting advice and logos are disabled.");
            Arc::new(DisabledGenerativeService)
        }
    };

    let conn = Connection::open(&args.db_path).expect("Could not open the database");
    let app_state = AppState::new(conn, &secret, &args.timezone, generative_service)
        .expect("Could not initialize the database")
        .with_submit_timeout(Duration::from_secs(args.submit_timeout_secs));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server stopped unexpectedly");
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
        // Errors are logged by the handlers.
        .on_failure(());

    router.layer(tracing_layer)
}
