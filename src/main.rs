mod cache;
mod constants;
mod data_backend;
mod data_types;
mod errors;
mod navbar;

use std::{env, sync::Arc, time::Duration};

use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, Method},
    response::Html,
    routing::get,
    Json, Router,
};
use clap::Parser;
use serde::Deserialize;
use tokio::{net::TcpListener, signal::ctrl_c};
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::CorsLayer;

use constants::{MENSA_XML_URL_DE, MENSA_XML_URL_EN};
use data_backend::{FeedUrls, MealPlanService};
use data_types::MealPlanDay;
use errors::FeedError;
use navbar::NavBar;

/// HTTP API serving the Mensa Ingolstadt meal plan as JSON.
/// {n}Feed data is cached in memory for one hour.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "MENSA_API_PORT", default_value_t = 8080)]
    port: u16,
    /// Override the German feed URL
    #[arg(long, env = "MENSA_FEED_URL_DE")]
    feed_url_de: Option<String>,
    /// Override the English feed URL
    #[arg(long, env = "MENSA_FEED_URL_EN")]
    feed_url_en: Option<String>,
    /// Enable verbose logging (fetch/parse timings){n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.verbose {
        env::set_var("RUST_LOG", "debug");
    }

    logger_init();
    log::info!("Starting mensa api...");

    let service = Arc::new(MealPlanService::new(FeedUrls {
        german: args
            .feed_url_de
            .unwrap_or_else(|| MENSA_XML_URL_DE.to_string()),
        english: args
            .feed_url_en
            .unwrap_or_else(|| MENSA_XML_URL_EN.to_string()),
    }));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/api/mensa", get(meal_plan_handler))
        .layer(cors)
        .with_state(service);

    let address = format!("0.0.0.0:{}", args.port);
    let listener = TcpListener::bind(&address)
        .await
        .expect("failed to bind listen address");
    log::info!("Listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server crashed");
}

#[derive(Deserialize)]
struct PlanQuery {
    lang: Option<String>,
}

async fn meal_plan_handler(
    State(service): State<Arc<MealPlanService>>,
    Query(query): Query<PlanQuery>,
) -> Result<Json<Vec<MealPlanDay>>, FeedError> {
    let plan = service.get_meal_plan(query.lang.as_deref()).await?;
    Ok(Json(plan))
}

async fn index_handler() -> Html<String> {
    let navbar = NavBar::new("Mensa Ingolstadt").show_back(false);

    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"de\">\n<head><meta charset=\"utf-8\"><title>Mensa Ingolstadt</title></head>\n<body>\n{}<main>\n  <p>Speiseplan: <a href=\"/api/mensa\">/api/mensa</a> (<code>?lang=de|en</code>)</p>\n</main>\n</body>\n</html>\n",
        navbar.render()
    ))
}

fn logger_init() {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module(
            module_path!(),
            if env::var(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV).unwrap_or_default()
                == "debug"
            {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        )
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("failed to install Ctrl+C handler");
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        log::info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
