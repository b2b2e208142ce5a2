use crate::database::error::{StoreError, parse_id};
use crate::database::user::UserRepository;
use crate::models::pagination::PageWindow;
use crate::models::query::{SearchCriteria, UserField};
use crate::models::user::{User, UserCreateRequest, UserUpdateRequest};
use chrono::Utc;
use regex::RegexBuilder;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

pub fn sample_user(nickname: &str, email: &str, country: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        first_name: "Yellow".to_string(),
        last_name: "King".to_string(),
        nickname: nickname.to_string(),
        password: "Carcosa".to_string(),
        email: email.to_string(),
        country: country.to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub fn create_request(nickname: &str, email: &str, country: &str) -> UserCreateRequest {
    UserCreateRequest {
        first_name: Some("Yellow".to_string()),
        last_name: Some("King".to_string()),
        nickname: nickname.to_string(),
        password: "Carcosa".to_string(),
        email: email.to_string(),
        country: Some(country.to_string()),
    }
}

fn field_value(user: &User, field: UserField) -> String {
    match field {
        UserField::Id => user.id.to_string(),
        UserField::FirstName => user.first_name.clone(),
        UserField::LastName => user.last_name.clone(),
        UserField::Nickname => user.nickname.clone(),
        UserField::Email => user.email.clone(),
        UserField::Country => user.country.clone(),
    }
}

fn matches(user: &User, criteria: &SearchCriteria) -> bool {
    let exact = criteria.exact.iter().all(|c| match c.field {
        UserField::Id => parse_id(&c.value).is_ok_and(|id| id == user.id),
        _ if c.value.contains('\0') => false,
        field => field_value(user, field) == c.value,
    });
    let partial = criteria.partial.iter().all(|c| {
        !c.pattern.contains('\0')
            && RegexBuilder::new(&c.pattern)
                .case_insensitive(true)
                .build()
                .map(|re| re.is_match(&field_value(user, c.field)))
                .unwrap_or(false)
    });
    exact && partial
}

/// Users kept in memory with the same semantics as the Postgres store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn with_users(users: Vec<User>) -> Self {
        Self { users: Mutex::new(users) }
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list_users(&self, criteria: &SearchCriteria, window: Option<PageWindow>) -> Result<(Vec<User>, i64), StoreError> {
        let mut found: Vec<User> = self.users.lock().unwrap().iter().filter(|u| matches(u, criteria)).cloned().collect();
        found.sort_by(|a, b| a.nickname.cmp(&b.nickname).then(a.id.cmp(&b.id)));
        let total = found.len() as i64;

        let page = match window {
            Some(window) => found
                .into_iter()
                .skip(usize::try_from(window.skip).unwrap_or(usize::MAX))
                .take(usize::try_from(window.limit).unwrap_or(usize::MAX))
                .collect(),
            None => found,
        };
        Ok((page, total))
    }

    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        let id = parse_id(id)?;
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_user(&self, request: &UserCreateRequest) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.nickname == request.nickname && u.email == request.email) {
            return Err(StoreError::DuplicateKey);
        }
        let user = request.to_user(Uuid::new_v4(), Utc::now());
        users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: &str, patch: &UserUpdateRequest) -> Result<User, StoreError> {
        let id = parse_id(id)?;
        let mut users = self.users.lock().unwrap();
        let position = users.iter().position(|u| u.id == id).ok_or(StoreError::NotFound)?;

        let mut updated = users[position].clone();
        patch.apply_to(&mut updated, Utc::now());
        if users
            .iter()
            .any(|u| u.id != id && u.nickname == updated.nickname && u.email == updated.email)
        {
            return Err(StoreError::DuplicateKey);
        }
        users[position] = updated.clone();
        Ok(updated)
    }

    async fn delete_user(&self, id: &str) -> Result<(), StoreError> {
        let id = parse_id(id)?;
        let mut users = self.users.lock().unwrap();
        let position = users.iter().position(|u| u.id == id).ok_or(StoreError::NotFound)?;
        users.remove(position);
        Ok(())
    }
}

/// Store whose every query runs past its deadline.
pub struct TimedOutRepository;

#[async_trait::async_trait]
impl UserRepository for TimedOutRepository {
    async fn list_users(&self, _criteria: &SearchCriteria, _window: Option<PageWindow>) -> Result<(Vec<User>, i64), StoreError> {
        Err(StoreError::Timeout(Duration::from_secs(2)))
    }

    async fn get_user(&self, _id: &str) -> Result<User, StoreError> {
        Err(StoreError::Timeout(Duration::from_secs(2)))
    }

    async fn create_user(&self, _request: &UserCreateRequest) -> Result<User, StoreError> {
        Err(StoreError::Timeout(Duration::from_secs(2)))
    }

    async fn update_user(&self, _id: &str, _patch: &UserUpdateRequest) -> Result<User, StoreError> {
        Err(StoreError::Timeout(Duration::from_secs(2)))
    }

    async fn delete_user(&self, _id: &str) -> Result<(), StoreError> {
        Err(StoreError::Timeout(Duration::from_secs(2)))
    }
}
