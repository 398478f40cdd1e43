use crate::domain::filters::{Filters, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DEFAULT_SORT};
use crate::domain::herb::{HerbPatch, NewHerb};
use crate::domain::validator::Validator;
use crate::transport::http::handlers::common::{
    catalog_error_response, json_400, not_found, ok_json, parse_id, read_csv, read_int,
    read_string,
};
use crate::transport::http::types::{
    ApiResponse, AppState, CreateHerbRequest, HerbEnvelope, HerbListView, HerbView,
    ListHerbsParams, UpdateHerbRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/v1/herbs",
    request_body = CreateHerbRequest,
    responses(
        (status = 201, description = "Herb created", body = ApiResponse),
        (status = 400, description = "Malformed body or price", body = ApiResponse),
        (status = 422, description = "Failed validation", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn create_herb_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateHerbRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_400(e),
    };
    let herb = match NewHerb::try_from(request) {
        Ok(herb) => herb,
        Err(e) => return catalog_error_response(e),
    };

    match state.catalog.insert(herb).await {
        Ok(herb) => {
            let location = format!("/v1/herbs/{}", herb.id);
            let mut response = ok_json(
                StatusCode::CREATED,
                &HerbEnvelope {
                    herb: HerbView::from(&herb),
                },
            );
            if let Ok(value) = HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, value);
            }
            response
        }
        Err(e) => catalog_error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/v1/herbs/{id}",
    params(
        ("id" = i64, Path, description = "Herb id")
    ),
    responses(
        (status = 200, description = "Herb found", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn show_herb_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let Some(id) = parse_id(&id) else {
        return not_found();
    };

    match state.catalog.get(id).await {
        Ok(herb) => ok_json(
            StatusCode::OK,
            &HerbEnvelope {
                herb: HerbView::from(&herb),
            },
        ),
        Err(e) => catalog_error_response(e),
    }
}

#[utoipa::path(
    patch,
    path = "/v1/herbs/{id}",
    params(
        ("id" = i64, Path, description = "Herb id")
    ),
    request_body = UpdateHerbRequest,
    responses(
        (status = 200, description = "Herb updated", body = ApiResponse),
        (status = 400, description = "Malformed body or price", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 409, description = "Edit conflict, re-read and retry", body = ApiResponse),
        (status = 422, description = "Failed validation", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn update_herb_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<UpdateHerbRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Some(id) = parse_id(&id) else {
        return not_found();
    };
    // The record must exist before the body is looked at.
    let herb = match state.catalog.get(id).await {
        Ok(herb) => herb,
        Err(e) => return catalog_error_response(e),
    };
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_400(e),
    };
    let patch = match HerbPatch::try_from(request) {
        Ok(patch) => patch,
        Err(e) => return catalog_error_response(e),
    };

    match state.catalog.apply_patch(herb, patch).await {
        Ok(herb) => ok_json(
            StatusCode::OK,
            &HerbEnvelope {
                herb: HerbView::from(&herb),
            },
        ),
        Err(e) => catalog_error_response(e),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/herbs/{id}",
    params(
        ("id" = i64, Path, description = "Herb id")
    ),
    responses(
        (status = 200, description = "Herb deleted", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn delete_herb_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let Some(id) = parse_id(&id) else {
        return not_found();
    };

    match state.catalog.delete(id).await {
        Ok(()) => ok_json(
            StatusCode::OK,
            &serde_json::json!({ "message": "herb successfully deleted" }),
        ),
        Err(e) => catalog_error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/v1/herbs",
    params(ListHerbsParams),
    responses(
        (status = 200, description = "One page of herbs", body = ApiResponse),
        (status = 422, description = "Invalid paging parameters", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn list_herbs_handler(
    State(state): State<AppState>,
    Query(params): Query<ListHerbsParams>,
) -> impl IntoResponse {
    let mut v = Validator::new();

    let name = read_string(params.name.as_deref(), "");
    let culinary_uses = read_csv(params.culinary_uses.as_deref());
    let filters = Filters {
        page: read_int(params.page.as_deref(), "page", DEFAULT_PAGE, &mut v),
        page_size: read_int(
            params.page_size.as_deref(),
            "page_size",
            DEFAULT_PAGE_SIZE,
            &mut v,
        ),
        sort: read_string(params.sort.as_deref(), DEFAULT_SORT),
    };

    match state
        .catalog
        .list_with(&name, &culinary_uses, &filters, &mut v)
        .await
    {
        Ok(list) => ok_json(StatusCode::OK, &HerbListView::from(&list)),
        Err(e) => catalog_error_response(e),
    }
}
