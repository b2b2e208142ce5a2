use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::pagination::PaginationParams;
use crate::models::query::UserListQuery;
use crate::models::user::{User, UserCreateRequest, UserUpdateRequest, UsersPage};
use crate::service::user::UserService;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{Responder, State, delete, get, patch, post};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::openapi;
use rocket_okapi::response::OpenApiResponderInner;

pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";
pub const PAGE_HEADER: &str = "X-Page";
pub const PER_PAGE_HEADER: &str = "X-Per-Page";

/// A page of users with the pagination metadata repeated in headers.
#[derive(Responder)]
pub struct PagedUsers {
    inner: Json<UsersPage>,
    total_count: Header<'static>,
    page: Header<'static>,
    per_page: Header<'static>,
}

impl From<UsersPage> for PagedUsers {
    fn from(page: UsersPage) -> Self {
        PagedUsers {
            total_count: Header::new(TOTAL_COUNT_HEADER, page.total_count.to_string()),
            page: Header::new(PAGE_HEADER, page.page.to_string()),
            per_page: Header::new(PER_PAGE_HEADER, page.per_page.to_string()),
            inner: Json(page),
        }
    }
}

impl OpenApiResponderInner for PagedUsers {
    fn responses(generator: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        <Json<UsersPage> as OpenApiResponderInner>::responses(generator)
    }
}

/// List users matching the query, sorted by nickname
#[openapi(tag = "Users")]
#[get("/?<query..>")]
pub async fn list_users(repo: &State<PostgresRepository>, query: UserListQuery) -> Result<PagedUsers, AppError> {
    let service = UserService::new(repo.inner());
    let pagination = PaginationParams::new(query.per_page, query.page);
    let page = service.list_users(&query.criteria(), &pagination).await?;
    Ok(PagedUsers::from(page))
}

/// Get a user by id
#[openapi(tag = "Users")]
#[get("/<id>")]
pub async fn get_user(repo: &State<PostgresRepository>, id: &str) -> Result<Json<User>, AppError> {
    let service = UserService::new(repo.inner());
    Ok(Json(service.get_user(id).await?))
}

/// Create a user
#[openapi(tag = "Users")]
#[post("/", data = "<payload>")]
pub async fn create_user(repo: &State<PostgresRepository>, payload: JsonBody<UserCreateRequest>) -> Result<(Status, Json<User>), AppError> {
    let service = UserService::new(repo.inner());
    let user = service.create_user(&payload).await?;
    Ok((Status::Created, Json(user)))
}

/// Update the supplied fields of a user
#[openapi(tag = "Users")]
#[patch("/?<id>", data = "<payload>")]
pub async fn update_user(repo: &State<PostgresRepository>, id: Option<&str>, payload: JsonBody<UserUpdateRequest>) -> Result<Json<User>, AppError> {
    let service = UserService::new(repo.inner());
    let user = service.update_user(id.unwrap_or_default(), &payload).await?;
    Ok(Json(user))
}

/// Delete a user. Deleting an unknown user also succeeds.
#[openapi(tag = "Users")]
#[delete("/?<id>")]
pub async fn delete_user(repo: &State<PostgresRepository>, id: Option<&str>) -> Result<Status, AppError> {
    let service = UserService::new(repo.inner());
    match service.delete_user(id.unwrap_or_default()).await {
        Ok(()) | Err(AppError::NotFound) => Ok(Status::NoContent),
        Err(e) => Err(e),
    }
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_users, get_user, create_user, update_user, delete_user]
}
