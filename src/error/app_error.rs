use crate::database::error::StoreError;
use crate::models::message::MessageResponse;
use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{Request, Response};
use rocket_okapi::OpenApiError;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::response::OpenApiResponderInner;
use std::io::Cursor;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid payload received: {0}")]
    InvalidPayload(String),
    #[error("Invalid payload received: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("Invalid user id: {0}")]
    InvalidIdentifier(String),
    #[error("User/Email already exists")]
    Conflict,
    #[error("Not Found")]
    NotFound,
    #[error("Server Error")]
    Internal {
        message: String,
        #[source]
        source: StoreError,
    },
    #[error("Server Error")]
    Configuration { message: String },
}

impl AppError {
    pub fn internal(message: impl Into<String>, source: StoreError) -> Self {
        Self::Internal {
            message: message.into(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Internal detail that is logged but never sent to the caller.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Internal { message, .. } | Self::Configuration { message } => Some(message),
            _ => None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey => AppError::Conflict,
            StoreError::NotFound => AppError::NotFound,
            StoreError::InvalidIdentifier(id) => AppError::InvalidIdentifier(id),
            StoreError::Timeout(_) => AppError::internal("Query timed out", e),
            StoreError::Storage { .. } => AppError::internal("Storage failure", e),
        }
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::configuration(format!("Failed to read configuration: {}", e))
    }
}

impl From<rocket_cors::Error> for AppError {
    fn from(e: rocket_cors::Error) -> Self {
        AppError::configuration(format!("Invalid CORS configuration: {}", e))
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::InvalidPayload(_) => Status::BadRequest,
            AppError::ValidationError(_) => Status::BadRequest,
            AppError::InvalidIdentifier(_) => Status::BadRequest,
            AppError::Conflict => Status::Conflict,
            AppError::NotFound => Status::NotFound,
            AppError::Internal { .. } => Status::InternalServerError,
            AppError::Configuration { .. } => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        let method = req.method();
        let uri = req.uri();

        let request_id = req
            .local_cache(|| None::<crate::middleware::RequestId>)
            .as_ref()
            .map(|r| r.0.as_str())
            .unwrap_or("unknown");

        let status = Status::from(&self);
        if status.class().is_server_error() {
            error!(
                error = ?self,
                detail = self.detail().unwrap_or_default(),
                request_id = %request_id,
                method = %method,
                uri = %uri,
                "request failed"
            );
        } else {
            warn!(
                error = %self,
                request_id = %request_id,
                method = %method,
                uri = %uri,
                "request rejected"
            );
        }

        let body = MessageResponse::new(self.to_string()).to_json();

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

impl OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse};
        let mut responses = Responses::default();
        for (code, description) in [
            ("400", "Bad Request"),
            ("404", "Not Found"),
            ("409", "Conflict"),
            ("500", "Internal Server Error"),
        ] {
            responses.responses.insert(
                code.to_string(),
                RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    ..Default::default()
                }),
            );
        }
        Ok(responses)
    }
}
