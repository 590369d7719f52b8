use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use box_loader::solver::Solver;
use box_loader::{Container, Dims, Item, LoadPlan, LoadReport, place_all_in_order};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

type ApiError = (StatusCode, String);

fn bad_request(e: impl ToString) -> ApiError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

#[derive(Deserialize, Serialize)]
struct VerifyRequest {
    container: Dims,
    items: Vec<Item>,
    orientations: Vec<Dims>,
}

#[derive(Serialize)]
struct VerifyResponse {
    fits: bool,
    #[serde(flatten)]
    report: LoadReport,
}

async fn optimize(Json(plan): Json<LoadPlan>) -> Result<Json<LoadReport>, ApiError> {
    tracing::info!(
        body = serde_json::to_string(&plan).unwrap_or_default(),
        "POST /optimize"
    );

    let plan = plan.validated().map_err(bad_request)?;

    let report = tokio::task::spawn_blocking(move || {
        let mut container = Container::new(plan.container)?;
        let outcome = Solver::new(plan.config).optimize(&mut container, &plan.items);
        Ok::<_, box_loader::Error>(LoadReport::new(&container, &outcome.not_placed))
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(bad_request)?;

    Ok(Json(report))
}

async fn verify(Json(req): Json<VerifyRequest>) -> Result<Json<VerifyResponse>, ApiError> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /verify"
    );

    if req.items.len() != req.orientations.len() {
        return Err(bad_request(format!(
            "got {} items but {} orientations",
            req.items.len(),
            req.orientations.len()
        )));
    }
    box_loader::types::check_unique_ids(&req.items).map_err(bad_request)?;
    for o in &req.orientations {
        o.validated().map_err(bad_request)?;
    }

    let response = tokio::task::spawn_blocking(move || {
        let mut container = Container::new(req.container)?;
        let items: Vec<&Item> = req.items.iter().collect();
        let fits = place_all_in_order(&mut container, &items, &req.orientations);
        let placed: Vec<&Item> = container.placements().iter().map(|p| p.item).collect();
        let not_placed: Vec<&Item> = items
            .iter()
            .copied()
            .filter(|i| !placed.iter().any(|p| std::ptr::eq(*p, *i)))
            .collect();
        Ok::<_, box_loader::Error>(VerifyResponse {
            fits,
            report: LoadReport::new(&container, &not_placed),
        })
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(bad_request)?;

    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    let _sentry = sentry::init((
        std::env::var("SENTRY_DSN").ok(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

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

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .route("/verify", post(verify))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_response_lists_placements_at_top_level() {
        let items = vec![Item::new("a", Dims::new(1, 1, 1), 3.0, 1.0).unwrap()];
        let mut container = Container::new(Dims::new(1, 1, 1)).unwrap();
        let refs: Vec<&Item> = items.iter().collect();
        let fits = place_all_in_order(&mut container, &refs, &[items[0].dims()]);

        let response = VerifyResponse {
            fits,
            report: LoadReport::new(&container, &[]),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["fits"], true);
        assert_eq!(json["placements"][0]["id"], "a");
        assert_eq!(json["total_value"], 3.0);
        assert!(json.get("report").is_none());
    }
}
