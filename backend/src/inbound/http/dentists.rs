//! Dentist directory handlers.
//!
//! ```text
//! GET    /api/v1/dentists?experienceYears[gte]=5&sort=-experienceYears&page=2&limit=1
//! GET    /api/v1/dentists/{id}
//! POST   /api/v1/dentists {"name":"Dr. Anan","experienceYears":8,"expertise":"Orthodontics"}
//! PUT    /api/v1/dentists/{id} {"expertise":"Endodontics"}
//! DELETE /api/v1/dentists/{id}
//! ```
//!
//! Reads are public; writes require the `admin` role.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::booking_ledger::dentist_not_found;
use crate::domain::{
    Dentist, DentistDetails, DentistDraft, DentistField, DentistId, DentistListQuery,
    DentistPatch, Error, Role,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::identity::Authenticated;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_dentist_error, map_query_error, require,
};

/// Dentist as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DentistResponse {
    pub id: Uuid,
    #[schema(example = "Dr. Anan")]
    pub name: String,
    #[schema(example = 8)]
    pub experience_years: i32,
    #[schema(example = "Orthodontics")]
    pub expertise: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Dentist> for DentistResponse {
    fn from(dentist: &Dentist) -> Self {
        Self {
            id: *dentist.id.as_uuid(),
            name: dentist.name.clone(),
            experience_years: dentist.experience_years,
            expertise: dentist.expertise.clone(),
            created_at: dentist.created_at,
            updated_at: dentist.updated_at,
        }
    }
}

/// Single dentist with the number of bookings that reference it.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DentistDetailsResponse {
    #[serde(flatten)]
    pub dentist: DentistResponse,
    pub booking_count: u64,
}

impl From<&DentistDetails> for DentistDetailsResponse {
    fn from(details: &DentistDetails) -> Self {
        Self {
            dentist: DentistResponse::from(&details.dentist),
            booking_count: details.booking_count,
        }
    }
}

/// Request body for `POST /api/v1/dentists` and `PUT /api/v1/dentists/{id}`.
///
/// Every field is required on create and optional on update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DentistRequest {
    pub name: Option<String>,
    pub experience_years: Option<i64>,
    pub expertise: Option<String>,
}

impl DentistRequest {
    fn into_draft(self) -> Result<DentistDraft, Error> {
        let experience_years =
            require(self.experience_years, FieldName::new("experienceYears"))?;
        DentistDraft::try_from_parts(
            self.name.as_deref().unwrap_or_default(),
            experience_years,
            self.expertise.as_deref().unwrap_or_default(),
        )
        .map_err(map_dentist_error)
    }

    fn into_patch(self) -> Result<DentistPatch, Error> {
        DentistPatch::try_from_parts(
            self.name.as_deref(),
            self.experience_years,
            self.expertise.as_deref(),
        )
        .map_err(map_dentist_error)
    }
}

/// Parse a path segment, treating a malformed id as an unknown dentist.
pub(crate) fn parse_dentist_id(raw: &str) -> Result<DentistId, Error> {
    DentistId::new(raw).map_err(|_| dentist_not_found(raw))
}

/// Keep only the selected fields (plus `id`) of a serialised dentist.
fn project(dentist: &Dentist, select: Option<&[DentistField]>) -> Result<Value, Error> {
    let mut value = serde_json::to_value(DentistResponse::from(dentist))
        .map_err(|err| Error::internal(format!("failed to serialise dentist: {err}")))?;
    if let (Some(fields), Value::Object(map)) = (select, &mut value) {
        map.retain(|key, _| {
            key == DentistField::Id.wire_name()
                || fields.iter().any(|field| field.wire_name() == key)
        });
    }
    Ok(value)
}

/// List dentists with filtering, sorting, projection, and paging.
#[utoipa::path(
    get,
    path = "/api/v1/dentists",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort keys; prefix `-` for descending. Defaults to `-createdAt`"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size, default 25"),
    ),
    responses(
        (status = 200, description = "One page of dentists with `count` and `pagination`", body = [DentistResponse]),
        (status = 400, description = "Malformed filter, sort, or page", body = ErrorSchema)
    ),
    tags = ["dentists"],
    operation_id = "listDentists",
    security([])
)]
#[get("/dentists")]
pub async fn list_dentists(
    state: web::Data<HttpState>,
    query: web::Query<Vec<(String, String)>>,
) -> ApiResult<HttpResponse> {
    let query = DentistListQuery::from_pairs(&query.into_inner()).map_err(map_query_error)?;
    let page = state.dentists.list_dentists(&query).await?;
    let select = query.select.as_deref();
    let items = page
        .items
        .iter()
        .map(|dentist| project(dentist, select))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(HttpResponse::Ok().json(Envelope::page(items, page.links)))
}

/// Fetch one dentist with its booking count.
#[utoipa::path(
    get,
    path = "/api/v1/dentists/{id}",
    params(("id" = String, Path, description = "Dentist identifier")),
    responses(
        (status = 200, description = "Dentist", body = DentistDetailsResponse),
        (status = 404, description = "No such dentist", body = ErrorSchema)
    ),
    tags = ["dentists"],
    operation_id = "getDentist",
    security([])
)]
#[get("/dentists/{id}")]
pub async fn get_dentist(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<DentistDetailsResponse>>> {
    let id = parse_dentist_id(&path)?;
    let details = state.dentists.get_dentist(&id).await?;
    Ok(web::Json(Envelope::data(DentistDetailsResponse::from(
        &details,
    ))))
}

/// Add a dentist. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/dentists",
    request_body = DentistRequest,
    responses(
        (status = 201, description = "Created", body = DentistResponse),
        (status = 400, description = "Invalid field", body = ErrorSchema),
        (status = 401, description = "Not authorized", body = ErrorSchema),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema)
    ),
    tags = ["dentists"],
    operation_id = "createDentist"
)]
#[post("/dentists")]
pub async fn create_dentist(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<DentistRequest>,
) -> ApiResult<HttpResponse> {
    caller.require(&[Role::Admin])?;
    let draft = payload.into_inner().into_draft()?;
    let dentist = state.dentists.create_dentist(draft).await?;
    Ok(HttpResponse::Created().json(Envelope::data(DentistResponse::from(&dentist))))
}

/// Change some fields of a dentist. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/dentists/{id}",
    params(("id" = String, Path, description = "Dentist identifier")),
    request_body = DentistRequest,
    responses(
        (status = 200, description = "Updated", body = DentistResponse),
        (status = 400, description = "Invalid field", body = ErrorSchema),
        (status = 401, description = "Not authorized", body = ErrorSchema),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema),
        (status = 404, description = "No such dentist", body = ErrorSchema)
    ),
    tags = ["dentists"],
    operation_id = "updateDentist"
)]
#[put("/dentists/{id}")]
pub async fn update_dentist(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<DentistRequest>,
) -> ApiResult<web::Json<Envelope<DentistResponse>>> {
    caller.require(&[Role::Admin])?;
    let id = parse_dentist_id(&path)?;
    let patch = payload.into_inner().into_patch()?;
    let dentist = state.dentists.update_dentist(&id, patch).await?;
    Ok(web::Json(Envelope::data(DentistResponse::from(&dentist))))
}

/// Remove a dentist and every booking that references it. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/dentists/{id}",
    params(("id" = String, Path, description = "Dentist identifier")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "Not authorized", body = ErrorSchema),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema),
        (status = 404, description = "No such dentist", body = ErrorSchema)
    ),
    tags = ["dentists"],
    operation_id = "deleteDentist"
)]
#[delete("/dentists/{id}")]
pub async fn delete_dentist(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    caller.require(&[Role::Admin])?;
    let id = parse_dentist_id(&path)?;
    state.dentists.delete_dentist(&id).await?;
    Ok(Envelope::deleted())
}

#[cfg(test)]
#[path = "dentists_tests.rs"]
mod tests;
