use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use sheet_packer::{Item, PackOptions, Solution, Solver};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct PackRequest {
    #[serde(flatten)]
    options: PackOptions,
    parts: Vec<PartRequest>,
}

#[derive(Deserialize, Serialize)]
struct PartRequest {
    width: f64,
    height: f64,
    #[serde(default = "default_qty")]
    qty: u32,
    #[serde(default)]
    label: Option<String>,
}

fn default_qty() -> u32 {
    1
}

#[derive(Serialize)]
struct PackResponse {
    #[serde(flatten)]
    solution: Solution<Option<String>>,
    sheet_count: usize,
    waste_percent: f64,
}

async fn pack(Json(req): Json<PackRequest>) -> Result<Json<PackResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /pack"
    );

    let solver = Solver::new(req.options).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    if req.parts.iter().any(|p| p.qty == 0) {
        return Err((
            StatusCode::BAD_REQUEST,
            "part quantity must be non-zero".to_string(),
        ));
    }

    // Parts with bad dimensions are not rejected here; they come back as
    // unplaced with a reason.
    let items: Vec<Item<Option<String>>> = req
        .parts
        .into_iter()
        .flat_map(|p| {
            (0..p.qty).map(move |_| Item::new(p.width, p.height, p.label.clone()))
        })
        .collect();

    let solution = tokio::task::spawn_blocking(move || solver.solve(items))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "packing task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "packing failed".to_string(),
            )
        })?;

    let response = PackResponse {
        sheet_count: solution.sheet_count(),
        waste_percent: solution.total_waste_percent(),
        solution,
    };

    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/pack", post(pack))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
