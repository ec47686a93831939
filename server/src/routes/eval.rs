use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppJsonResult},
    eval::{EvalRequest, EvaluationHarness},
    model::api::{EvalReport, PrecisionAtK},
    state::ServerState,
};

#[derive(Debug, Deserialize)]
pub struct EvalQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub k: Option<String>,
}

fn default_ks() -> Vec<usize> {
    vec![5, 10, 20]
}

fn parse_ks(raw: &Option<String>) -> AppResultKs {
    let Some(raw) = raw else {
        return Ok(default_ks());
    };

    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| AppError::BadRequest(format!("invalid k value: {part}")))
        })
        .collect()
}

type AppResultKs = Result<Vec<usize>, AppError>;

/// `GET /users/:id/eval?start=&end=&k=5,10,20` — runs the offline evaluation harness on demand
/// (SPEC_FULL §4.7, §6).
pub async fn handler_eval(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<EvalQuery>,
) -> AppJsonResult<EvalReport> {
    if query.end <= query.start {
        return Err(AppError::BadRequest("end must be after start".to_string()));
    }

    let ks = parse_ks(&query.k)?;
    let request = EvalRequest {
        user_id,
        start: query.start,
        end: query.end,
        ks,
    };

    let report = EvaluationHarness::run(&state.conn, &request).await?;

    let precision_at_k = report
        .precision_at_k
        .into_iter()
        .map(|(k, precision)| PrecisionAtK { k, precision })
        .collect();

    Ok(Json(EvalReport {
        precision_at_k,
        coverage: report.coverage,
        novelty: report.novelty,
        stability: report.stability,
    }))
}
