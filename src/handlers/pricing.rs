use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::{
    catalog::{CheapestRegion, CostQuote, LookupError, MachineMatch, ScaledCosts},
    error::AppError,
    handlers::AppState,
    metrics,
};

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    pub cpu_type: String,
    pub region: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PriceResponse {
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct CostParams {
    pub cpus: u32,
    pub memory: u32,
    pub region: String,
}

#[derive(Debug, Deserialize)]
pub struct MachineParams {
    pub cpus: u32,
    pub memory: f64,
}

#[derive(Debug, Deserialize)]
pub struct ScaledParams {
    pub cpus: u32,
    pub memory: f64,
    pub scale: u32,
}

#[derive(Debug, Deserialize)]
pub struct CheapestParams {
    pub cpus: u32,
    pub memory: f64,
    pub quantity: u32,
}

/// Record the lookup outcome and convert its error for the client
fn observe<T>(
    operation: &'static str,
    start: Instant,
    result: Result<T, LookupError>,
) -> Result<T, AppError> {
    let outcome = if result.is_ok() { "found" } else { "not_found" };
    metrics::record_lookup(operation, outcome, start.elapsed());

    if let Err(e) = &result {
        tracing::debug!(operation, "Lookup found nothing: {}", e);
    }
    result.map_err(AppError::from)
}

fn check_memory(memory: f64) -> Result<(), AppError> {
    if memory.is_finite() && memory >= 0.0 {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "memory must be a non-negative number of GB, got {}",
            memory
        )))
    }
}

/// Handle `POST /get_price/`: price of a machine type in one region
pub async fn get_price(
    State(state): State<AppState>,
    Json(request): Json<PriceRequest>,
) -> Result<Json<PriceResponse>, AppError> {
    let start = Instant::now();
    tracing::debug!(
        machine_type = %request.cpu_type,
        region = %request.region,
        "Handling price lookup"
    );

    let price = observe(
        "price",
        start,
        state.catalog.price(&request.cpu_type, &request.region),
    )?;

    Ok(Json(PriceResponse { price }))
}

/// Handle `GET /get_cost`: first machine with the exact CPU/memory shape
pub async fn get_cost(
    State(state): State<AppState>,
    Query(params): Query<CostParams>,
) -> Result<Json<CostQuote>, AppError> {
    let start = Instant::now();
    tracing::debug!(
        cpus = params.cpus,
        memory = params.memory,
        region = %params.region,
        "Handling cost lookup"
    );

    let quote = observe(
        "cost",
        start,
        state
            .catalog
            .cost(params.cpus, params.memory, &params.region),
    )?;

    Ok(Json(quote))
}

/// Handle `GET /machines`: every machine type matching the CPU/memory shape
pub async fn list_machines(
    State(state): State<AppState>,
    Query(params): Query<MachineParams>,
) -> Result<Json<Vec<MachineMatch>>, AppError> {
    check_memory(params.memory)?;
    let start = Instant::now();

    let matches = state.catalog.matching_machines(params.cpus, params.memory);
    let result = if matches.is_empty() {
        Err(LookupError::NoCandidates {
            cpus: params.cpus,
            memory_gb: params.memory,
        })
    } else {
        Ok(matches)
    };

    Ok(Json(observe("machines", start, result)?))
}

/// Handle `GET /matching_machine_types`: scaled per-region cost of every
/// matching machine type
pub async fn matching_machine_types(
    State(state): State<AppState>,
    Query(params): Query<ScaledParams>,
) -> Result<Json<ScaledCosts>, AppError> {
    check_memory(params.memory)?;
    let start = Instant::now();
    tracing::debug!(
        cpus = params.cpus,
        memory = params.memory,
        scale = params.scale,
        "Handling scaled cost lookup"
    );

    let costs = observe(
        "matching_machine_types",
        start,
        state
            .catalog
            .scaled_costs(params.cpus, params.memory, params.scale),
    )?;

    Ok(Json(costs))
}

/// Handle `GET /cheapest_region`: cheapest machine/region for a quantity
pub async fn cheapest_region(
    State(state): State<AppState>,
    Query(params): Query<CheapestParams>,
) -> Result<Json<CheapestRegion>, AppError> {
    check_memory(params.memory)?;
    let start = Instant::now();
    tracing::debug!(
        cpus = params.cpus,
        memory = params.memory,
        quantity = params.quantity,
        "Handling cheapest region lookup"
    );

    let best = observe(
        "cheapest_region",
        start,
        state
            .catalog
            .cheapest_region(params.cpus, params.memory, params.quantity),
    )?;

    Ok(Json(best))
}
