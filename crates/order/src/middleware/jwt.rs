use crate::domain::requests::actor::Actor;
use axum::{
    Extension, Json,
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use shared::{abstract_trait::DynJwtService, errors::ErrorResponse};
use tracing::warn;

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            status: "fail".to_string(),
            code: None,
            message: message.to_string(),
        }),
    )
}

/// Resolves the caller from the `token` cookie or a bearer header and makes
/// it available to handlers as `Extension<Actor>`.
pub async fn auth_middleware(
    cookie_jar: CookieJar,
    Extension(jwt): Extension<DynJwtService>,
    mut req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let token = cookie_jar
        .get("token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| auth_value.strip_prefix("Bearer ").map(str::to_owned))
        });

    let Some(token) = token else {
        return Err(unauthorized("You are not logged in, please provide token"));
    };

    let claims = jwt.verify_token(&token, "access").map_err(|err| {
        warn!("🔒 Rejected token: {err}");
        unauthorized("Invalid token")
    })?;

    req.extensions_mut().insert(Actor::from(claims));

    Ok(next.run(req).await)
}
