use crate::models::message::MessageResponse;
use rocket::get;
use rocket::serde::json::Json;
use rocket_okapi::openapi;

/// Liveness probe
#[openapi(tag = "Health")]
#[get("/")]
pub async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse::new("pong"))
}

/// Service status
#[openapi(tag = "Health")]
#[get("/")]
pub async fn healthcheck() -> Json<MessageResponse> {
    Json(MessageResponse::new("UP"))
}

pub fn ping_routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![ping]
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![healthcheck]
}
