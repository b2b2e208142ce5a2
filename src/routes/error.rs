use crate::models::message::MessageResponse;
use rocket::serde::json::Json;
use rocket::{Request, catch};

#[catch(400)]
pub fn bad_request(_: &Request) -> Json<MessageResponse> {
    Json(MessageResponse::new("Invalid payload received"))
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<MessageResponse> {
    Json(MessageResponse::new("Not Found"))
}

#[catch(409)]
pub fn conflict(_: &Request) -> Json<MessageResponse> {
    Json(MessageResponse::new("Conflict"))
}

#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> Json<MessageResponse> {
    Json(MessageResponse::new("Invalid payload received"))
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<MessageResponse> {
    Json(MessageResponse::new("Server Error"))
}
