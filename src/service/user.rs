use crate::database::error::StoreError;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::pagination::PaginationParams;
use crate::models::query::SearchCriteria;
use crate::models::user::{User, UserCreateRequest, UserUpdateRequest, UsersPage};
use tracing::info;
use validator::Validate;

pub struct UserService<'a, R: UserRepository + ?Sized> {
    repository: &'a R,
}

impl<'a, R: UserRepository + ?Sized> UserService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        UserService { repository }
    }

    pub async fn list_users(&self, criteria: &SearchCriteria, pagination: &PaginationParams) -> Result<UsersPage, AppError> {
        let resolved = pagination.resolve();
        let (users, total_count) = self.repository.list_users(criteria, resolved.window).await?;

        Ok(UsersPage {
            users,
            page: resolved.page,
            per_page: resolved.per_page,
            total_count,
        })
    }

    pub async fn get_user(&self, id: &str) -> Result<User, AppError> {
        Ok(self.repository.get_user(id).await?)
    }

    pub async fn create_user(&self, request: &UserCreateRequest) -> Result<User, AppError> {
        request.validate()?;

        let user = self.repository.create_user(request).await?;
        info!(user_id = %user.id, nickname = %user.nickname, "user created");
        Ok(user)
    }

    pub async fn update_user(&self, id: &str, patch: &UserUpdateRequest) -> Result<User, AppError> {
        if patch.is_empty() {
            return Err(AppError::InvalidPayload("no fields to update".to_string()));
        }
        patch.validate()?;

        let user = self.repository.update_user(id, patch).await?;
        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// A malformed id is reported the same way as a missing record.
    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        match self.repository.delete_user(id).await {
            Ok(()) => {
                info!(user_id = %id, "user deleted");
                Ok(())
            }
            Err(StoreError::InvalidIdentifier(_)) => Err(AppError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}
