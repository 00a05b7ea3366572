//! Residency HTTP handlers.
//!
//! ```text
//! GET  /api/residency
//! GET  /api/residency/allresd
//! GET  /api/residency/{id}
//! POST /api/residency/create {"data": {"title":"Loft","price":"1200","userEmail":"a@x.com"}}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;
use tracing::debug;

use crate::domain::{Error, Residency, ResidencyDraft, ResidencyId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, ResidencyDraftSchema, ResidencySchema};
use crate::inbound::http::state::HttpState;

/// Create payload: either wrapped in `data` or sent as bare fields.
///
/// A top-level `data` key always selects the wrapped form, so type errors
/// inside it are reported as such.
#[derive(Debug)]
pub struct CreateResidencyRequest(ResidencyDraft);

impl<'de> Deserialize<'de> for CreateResidencyRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut body = Value::deserialize(deserializer)?;
        let wrapped = body.as_object_mut().and_then(|fields| fields.remove("data"));
        ResidencyDraft::deserialize(wrapped.unwrap_or(body))
            .map(Self)
            .map_err(de::Error::custom)
    }
}

impl From<CreateResidencyRequest> for ResidencyDraft {
    fn from(value: CreateResidencyRequest) -> Self {
        value.0
    }
}

fn residency_not_found() -> Error {
    Error::not_found("Residency not found")
}

async fn list(state: &HttpState) -> ApiResult<web::Json<Vec<Residency>>> {
    let residencies = state.residencies_query.list_all().await?;
    debug!(count = residencies.len(), "listed residencies");
    Ok(web::Json(residencies))
}

/// List every residency, newest first.
#[utoipa::path(
    get,
    path = "/api/residency",
    responses(
        (status = 200, description = "Residencies, newest first", body = [ResidencySchema]),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["residencies"],
    operation_id = "listResidencies"
)]
#[get("/residency")]
pub async fn list_residencies(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Residency>>> {
    list(&state).await
}

/// Legacy alias of [`list_residencies`].
#[get("/residency/allresd")]
pub async fn list_residencies_legacy(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<Residency>>> {
    list(&state).await
}

/// Fetch one residency. Identifiers that are not UUIDs cannot match and
/// read as missing.
#[utoipa::path(
    get,
    path = "/api/residency/{id}",
    params(("id" = String, Path, description = "Residency identifier")),
    responses(
        (status = 200, description = "Residency", body = ResidencySchema),
        (status = 404, description = "Residency not found", body = ErrorSchema)
    ),
    tags = ["residencies"],
    operation_id = "getResidency"
)]
#[get("/residency/{id}")]
pub async fn get_residency(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Residency>> {
    let id: ResidencyId = path.parse().map_err(|_| residency_not_found())?;
    let residency = state.residencies_query.get_by_id(&id).await?;
    Ok(web::Json(residency))
}

/// Create a residency, provisioning the owner when needed.
#[utoipa::path(
    post,
    path = "/api/residency/create",
    request_body(
        content = ResidencyDraftSchema,
        description = "Listing fields, optionally wrapped as {\"data\": {...}}"
    ),
    responses(
        (status = 200, description = "Created residency", body = ResidencySchema),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 409, description = "Duplicate address for owner", body = ErrorSchema)
    ),
    tags = ["residencies"],
    operation_id = "createResidency"
)]
#[post("/residency/create")]
pub async fn create_residency(
    state: web::Data<HttpState>,
    payload: web::Json<CreateResidencyRequest>,
) -> ApiResult<HttpResponse> {
    let draft = ResidencyDraft::from(payload.into_inner());
    let residency = state.residencies.create(draft).await?;
    Ok(HttpResponse::Ok().json(residency))
}
