use crate::{
    abstract_trait::order::service::DynOrderQueryService,
    domain::response::variant::StockResponse,
    middleware::jwt::auth_middleware,
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    middleware,
    response::IntoResponse,
    routing::get,
};
use shared::{
    domain::responses::ApiResponse,
    errors::{ErrorResponse, HttpError},
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/variants/{id}/stock",
    tag = "Inventory",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Variant ID")),
    responses(
        (status = 200, description = "Units currently in stock", body = ApiResponse<StockResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Variant not found", body = ErrorResponse)
    )
)]
pub async fn get_variant_stock(
    Extension(service): Extension<DynOrderQueryService>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.get_stock(id).await?;
    Ok(Json(response))
}

pub fn variant_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/variants/{id}/stock", get(get_variant_stock))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.order_query.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
