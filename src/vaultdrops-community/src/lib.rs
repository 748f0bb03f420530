//! VaultDrops Community API Server
//!
//! REST API for the shared drop-rate pool: clients publish snapshots of
//! their local tallies, the server keeps one live record per
//! `(tracker_id, client_id)` and serves community-wide aggregates with
//! Wilson score intervals.
//!
//! The router is built here (not in `main.rs`) so tests can drive it with
//! `tower::ServiceExt::oneshot` against an in-memory store.

use std::sync::Arc;

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{OpenApi, ToSchema};
use utoipa_scalar::{Scalar, Servable};
use vaultdrops::{
    Catalog, Estimate, FlatAggregate, MatrixAggregate, Submission, TallyCounts, TrackerDef,
    TrackerShape, CHARACTERS, CLASS_MODS_TRACKER_ID, MATRIX_DIM,
};
use vaultdrops_store::{SqlxSqliteDb, SubmissionsRepository};

// =============================================================================
// App State
// =============================================================================

pub struct AppState {
    pub db: SqlxSqliteDb,
    pub catalog: Catalog,
}

// =============================================================================
// OpenAPI Schema
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "VaultDrops Community API",
        description = "Shared drop-rate pool for Borderlands 4 loot tracking",
        version = "0.1.0",
        license(name = "BSD-2-Clause"),
    ),
    paths(
        health,
        publish_submission,
        list_trackers,
        list_submissions,
        tracker_aggregate,
        get_stats,
    ),
    components(schemas(
        HealthResponse,
        SubmissionRequest,
        PublishResponse,
        TrackerEntry,
        TrackersResponse,
        SubmissionView,
        SubmissionsResponse,
        OutcomeBody,
        DedicatedBody,
        FlatAggregateResponse,
        MatrixCellBody,
        MatrixRowBody,
        MatrixAggregateResponse,
        AggregateResponse,
        StatsResponse,
    ))
)]
struct ApiDoc;

// =============================================================================
// Types
// =============================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Publish body: one client's current snapshot for one tracker. The counts
/// value is either a `{"<column>": n}` object (boss trackers) or a bare
/// 4x4 array (class mods); malformed snapshots are accepted here and
/// skipped at aggregation time.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmissionRequest {
    pub tracker_id: String,
    pub client_id: String,
    pub counts: serde_json::Value,
    pub total_trials: u64,
    /// RFC 3339; filled in server-side when absent.
    #[serde(default)]
    pub submitted_at: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublishResponse {
    /// True for a client's first record on this tracker, false when its
    /// previous snapshot was replaced.
    pub created: bool,
    pub revision: i64,
    pub submitted_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackerEntry {
    pub tracker_id: String,
    pub submissions: i64,
    pub total_trials: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackersResponse {
    pub trackers: Vec<TrackerEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionView {
    pub client_id: String,
    pub counts: serde_json::Value,
    pub total_trials: u64,
    pub submitted_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionsResponse {
    pub tracker_id: String,
    pub submissions: Vec<SubmissionView>,
}

/// One outcome column of a flat aggregate, Wilson interval flattened in.
#[derive(Debug, Serialize, ToSchema)]
pub struct OutcomeBody {
    pub column: usize,
    pub label: String,
    pub count: u64,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
    pub moe: f64,
}

/// The combined "any dedicated drop" row.
#[derive(Debug, Serialize, ToSchema)]
pub struct DedicatedBody {
    pub count: u64,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
    pub moe: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FlatAggregateResponse {
    pub tracker_id: String,
    pub shape: &'static str,
    pub trials: u64,
    pub clients: usize,
    pub skipped: usize,
    pub outcomes: Vec<OutcomeBody>,
    pub dedicated: DedicatedBody,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MatrixCellBody {
    pub character: String,
    pub count: u64,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
    pub moe: f64,
}

/// One played-character row; cells are conditional on this row's trials.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatrixRowBody {
    pub character: String,
    pub trials: u64,
    pub cells: Vec<MatrixCellBody>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MatrixAggregateResponse {
    pub tracker_id: String,
    pub shape: &'static str,
    pub trials: u64,
    pub clients: usize,
    pub skipped: usize,
    pub rows: Vec<MatrixRowBody>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum AggregateResponse {
    Flat(FlatAggregateResponse),
    Matrix(MatrixAggregateResponse),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub submissions: i64,
    pub trackers: i64,
    pub total_trials: i64,
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "System"
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "vaultdrops-community",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[utoipa::path(
    get,
    path = "/stats",
    responses((status = 200, description = "Store totals", body = StatsResponse)),
    tag = "System"
)]
async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    let stats = state
        .db
        .stats()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(StatsResponse {
        submissions: stats.submissions,
        trackers: stats.trackers,
        total_trials: stats.total_trials,
    }))
}

#[utoipa::path(
    post,
    path = "/submissions",
    request_body = SubmissionRequest,
    responses(
        (status = 200, description = "Snapshot stored", body = PublishResponse),
        (status = 400, description = "Blank ids or zero trials")
    ),
    tag = "Submissions"
)]
async fn publish_submission(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmissionRequest>,
) -> Result<Json<PublishResponse>, (StatusCode, String)> {
    // Same guards the client runs before sending; a client that skips them
    // still cannot file an empty or anonymous-less record.
    if req.tracker_id.trim().is_empty() || req.client_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "tracker_id and client_id must be non-empty".to_string(),
        ));
    }
    if req.total_trials == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "nothing to publish: submission has zero trials".to_string(),
        ));
    }

    let submission = Submission {
        tracker_id: req.tracker_id,
        client_id: req.client_id,
        counts: req.counts,
        total_trials: req.total_trials,
        submitted_at: req
            .submitted_at
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
    };

    let outcome = state
        .db
        .upsert_submission(&submission)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    tracing::info!(
        tracker = %submission.tracker_id,
        created = outcome.created,
        revision = outcome.revision,
        trials = submission.total_trials,
        "submission stored"
    );

    Ok(Json(PublishResponse {
        created: outcome.created,
        revision: outcome.revision,
        submitted_at: submission.submitted_at,
    }))
}

#[utoipa::path(
    get,
    path = "/trackers",
    responses((status = 200, description = "Trackers with live submissions", body = TrackersResponse)),
    tag = "Trackers"
)]
async fn list_trackers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TrackersResponse>, (StatusCode, String)> {
    let summaries = state
        .db
        .tracker_summaries()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(TrackersResponse {
        trackers: summaries
            .into_iter()
            .map(|s| TrackerEntry {
                tracker_id: s.tracker_id,
                submissions: s.submissions,
                total_trials: s.total_trials,
            })
            .collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/trackers/{tracker_id}/submissions",
    params(("tracker_id" = String, Path, description = "Tracker id (boss slug or 'classmods')")),
    responses((status = 200, description = "Live records for the tracker", body = SubmissionsResponse)),
    tag = "Trackers"
)]
async fn list_submissions(
    State(state): State<Arc<AppState>>,
    AxumPath(tracker_id): AxumPath<String>,
) -> Result<Json<SubmissionsResponse>, (StatusCode, String)> {
    let records = state
        .db
        .submissions_for_tracker(&tracker_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(SubmissionsResponse {
        tracker_id,
        submissions: records
            .into_iter()
            .map(|r| SubmissionView {
                client_id: r.client_id,
                counts: r.counts,
                total_trials: r.total_trials,
                submitted_at: r.submitted_at,
            })
            .collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/trackers/{tracker_id}/aggregate",
    params(("tracker_id" = String, Path, description = "Tracker id (boss slug or 'classmods')")),
    responses((status = 200, description = "Community aggregate with Wilson intervals", body = AggregateResponse)),
    tag = "Trackers"
)]
async fn tracker_aggregate(
    State(state): State<Arc<AppState>>,
    AxumPath(tracker_id): AxumPath<String>,
) -> Result<Json<AggregateResponse>, (StatusCode, String)> {
    let records = state
        .db
        .submissions_for_tracker(&tracker_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    if tracker_id == CLASS_MODS_TRACKER_ID {
        let agg = MatrixAggregate::from_records(&records);
        return Ok(Json(matrix_response(&tracker_id, &agg)));
    }

    // Known bosses get catalog labels; anything else still aggregates,
    // labelled by bare column index.
    let tracker = match state.catalog.get(&tracker_id) {
        Some(entry) => TrackerDef::boss(entry),
        None => indexed_tracker(&tracker_id, &records),
    };

    let agg = FlatAggregate::from_records(&tracker, &records);
    Ok(Json(flat_response(&tracker_id, &agg)))
}

// =============================================================================
// Aggregate rendering
// =============================================================================

/// Fallback tracker for ids the catalog does not know: columns are named
/// after their index, sized to the widest valid snapshot.
fn indexed_tracker(tracker_id: &str, records: &[Submission]) -> TrackerDef {
    let max_column = records
        .iter()
        .filter_map(|r| TallyCounts::from_snapshot(&r.counts))
        .flat_map(|counts| counts.cells().map(|(col, _)| col).collect::<Vec<_>>())
        .max();

    let columns = match max_column {
        Some(max) => (0..=max).map(|i| format!("Column {i}")).collect(),
        None => Vec::new(),
    };

    TrackerDef {
        name: tracker_id.to_string(),
        slug: tracker_id.to_string(),
        community_id: Some(tracker_id.to_string()),
        shape: TrackerShape::Flat { columns },
    }
}

fn flat_response(tracker_id: &str, agg: &FlatAggregate) -> AggregateResponse {
    AggregateResponse::Flat(FlatAggregateResponse {
        tracker_id: tracker_id.to_string(),
        shape: "flat",
        trials: agg.trials,
        clients: agg.clients,
        skipped: agg.skipped,
        outcomes: agg
            .outcomes
            .iter()
            .map(|o| OutcomeBody {
                column: o.column,
                label: o.label.clone(),
                count: o.count,
                point: o.estimate.point,
                lower: o.estimate.lower,
                upper: o.estimate.upper,
                moe: o.estimate.moe,
            })
            .collect(),
        dedicated: DedicatedBody {
            count: agg.dedicated_count,
            point: agg.dedicated.point,
            lower: agg.dedicated.lower,
            upper: agg.dedicated.upper,
            moe: agg.dedicated.moe,
        },
    })
}

fn matrix_response(tracker_id: &str, agg: &MatrixAggregate) -> AggregateResponse {
    let rows = (0..MATRIX_DIM)
        .map(|r| MatrixRowBody {
            character: CHARACTERS[r].to_string(),
            trials: agg.row_trials[r],
            cells: (0..MATRIX_DIM)
                .map(|c| {
                    let est: Estimate = agg.estimate(r, c);
                    MatrixCellBody {
                        character: CHARACTERS[c].to_string(),
                        count: agg.cells[r][c],
                        point: est.point,
                        lower: est.lower,
                        upper: est.upper,
                        moe: est.moe,
                    }
                })
                .collect(),
        })
        .collect();

    AggregateResponse::Matrix(MatrixAggregateResponse {
        tracker_id: tracker_id.to_string(),
        shape: "matrix",
        trials: agg.grand_total(),
        clients: agg.clients,
        skipped: agg.skipped,
        rows,
    })
}

// =============================================================================
// Router
// =============================================================================

/// Build the full application router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/submissions", post(publish_submission))
        .route("/trackers", get(list_trackers))
        .route("/trackers/{tracker_id}/submissions", get(list_submissions))
        .route("/trackers/{tracker_id}/aggregate", get(tracker_aggregate))
        .route("/stats", get(get_stats))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
