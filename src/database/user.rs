use crate::database::error::{StoreError, parse_id};
use crate::database::postgres_repository::PostgresRepository;
use crate::models::pagination::PageWindow;
use crate::models::query::{SearchCriteria, UserField};
use crate::models::user::{User, UserCreateRequest, UserUpdateRequest};
use chrono::Utc;
use sqlx::{Connection, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, first_name, last_name, nickname, password, email, country, created_at, updated_at";

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns the matching users in the window, sorted by nickname, plus the
    /// number of matches ignoring the window.
    async fn list_users(&self, criteria: &SearchCriteria, window: Option<PageWindow>) -> Result<(Vec<User>, i64), StoreError>;
    async fn get_user(&self, id: &str) -> Result<User, StoreError>;
    async fn create_user(&self, request: &UserCreateRequest) -> Result<User, StoreError>;
    async fn update_user(&self, id: &str, patch: &UserUpdateRequest) -> Result<User, StoreError>;
    async fn delete_user(&self, id: &str) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl UserRepository for PostgresRepository {
    async fn list_users(&self, criteria: &SearchCriteria, window: Option<PageWindow>) -> Result<(Vec<User>, i64), StoreError> {
        debug!(criteria = ?criteria, window = ?window, "finding users matching criteria");

        let mut conn = self.lease().await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filter(&mut count, criteria);
        let total = self.bounded(count.build_query_scalar::<i64>().fetch_one(&mut *conn)).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_filter(&mut select, criteria);
        select.push(r#" ORDER BY nickname COLLATE "C" ASC, id ASC"#);
        if let Some(window) = window {
            select.push(" LIMIT ").push_bind(window.limit);
            select.push(" OFFSET ").push_bind(window.skip);
        }
        let users = self.bounded(select.build_query_as::<User>().fetch_all(&mut *conn)).await?;

        Ok((users, total))
    }

    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        let id = parse_id(id)?;
        let mut conn = self.lease().await?;

        let user = self
            .bounded(
                sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                    .bind(id)
                    .fetch_optional(&mut *conn),
            )
            .await?;

        user.ok_or(StoreError::NotFound)
    }

    async fn create_user(&self, request: &UserCreateRequest) -> Result<User, StoreError> {
        let user = request.to_user(Uuid::new_v4(), Utc::now());
        let mut conn = self.lease().await?;

        let created = self
            .bounded(
                sqlx::query_as::<_, User>(&format!(
                    r#"
                    INSERT INTO users (id, first_name, last_name, nickname, password, email, country, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    RETURNING {USER_COLUMNS}
                    "#
                ))
                .bind(user.id)
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(&user.nickname)
                .bind(&user.password)
                .bind(&user.email)
                .bind(&user.country)
                .bind(user.created_at)
                .bind(user.updated_at)
                .fetch_one(&mut *conn),
            )
            .await?;

        Ok(created)
    }

    async fn update_user(&self, id: &str, patch: &UserUpdateRequest) -> Result<User, StoreError> {
        let id = parse_id(id)?;
        let mut conn = self.lease().await?;
        let mut tx = self.bounded(Connection::begin(&mut *conn)).await?;

        let stored = self
            .bounded(
                sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"))
                    .bind(id)
                    .fetch_optional(&mut *tx),
            )
            .await?;
        let mut user = stored.ok_or(StoreError::NotFound)?;
        patch.apply_to(&mut user, Utc::now());

        let updated = self
            .bounded(
                sqlx::query_as::<_, User>(&format!(
                    r#"
                    UPDATE users
                    SET first_name = $1, last_name = $2, nickname = $3, password = $4, email = $5, country = $6, updated_at = $7
                    WHERE id = $8
                    RETURNING {USER_COLUMNS}
                    "#
                ))
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(&user.nickname)
                .bind(&user.password)
                .bind(&user.email)
                .bind(&user.country)
                .bind(user.updated_at)
                .bind(user.id)
                .fetch_one(&mut *tx),
            )
            .await?;

        self.bounded(tx.commit()).await?;
        Ok(updated)
    }

    async fn delete_user(&self, id: &str) -> Result<(), StoreError> {
        let id = parse_id(id)?;
        let mut conn = self.lease().await?;

        let result = self
            .bounded(sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&mut *conn))
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Appends the WHERE clause for `criteria`. Every criterion is ANDed.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, criteria: &SearchCriteria) {
    let mut keyword = " WHERE ";

    for criterion in &criteria.exact {
        builder.push(keyword);
        keyword = " AND ";
        match criterion.field {
            // An identifier that does not parse cannot match any row
            UserField::Id => match Uuid::parse_str(&criterion.value) {
                Ok(id) => {
                    builder.push("id = ").push_bind(id);
                }
                Err(_) => {
                    builder.push("FALSE");
                }
            },
            _ if criterion.value.contains('\0') => {
                builder.push("FALSE");
            }
            field => {
                builder.push(field.column()).push(" = ").push_bind(criterion.value.clone());
            }
        }
    }

    for criterion in &criteria.partial {
        builder.push(keyword);
        keyword = " AND ";
        // Text columns never hold NUL, so such a value cannot match
        if criterion.pattern.contains('\0') {
            builder.push("FALSE");
        } else {
            builder.push(criterion.field.column()).push(" ~* ").push_bind(criterion.pattern.clone());
        }
    }
}
