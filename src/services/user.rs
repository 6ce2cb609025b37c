// src/services/user.rs

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::models::{unix_now, Organization, RecordId, User};
use crate::services::validation::{is_blank, is_valid_email};
use crate::services::{QueryParams, QueryResult};
use crate::store::{Repository, Store};

pub const USER_UPDATED: &str = "User updated successfully.";
pub const USER_DELETED: &str = "User deleted successfully.";
pub const USER_ASSOCIATED: &str = "User associated with organization successfully.";
pub const USER_OR_ORGANIZATION_NOT_FOUND: &str = "User or organization not found.";
pub const USER_DISASSOCIATED: &str = "User disassociated from organization successfully.";
pub const USER_NOT_FOUND: &str = "User not found.";

const CREDENTIALS_REQUIRED: &str = "Username and Email are required.";
const INVALID_EMAIL: &str = "Invalid email format.";
const USER_TAKEN: &str = "User with this username or email already exists.";

/// Сервис пользователей и их привязки к организациям
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn Repository<User>>,
    organizations: Arc<dyn Repository<Organization>>,
}

impl UserService {
    pub fn new(store: &Store) -> Self {
        Self {
            users: store.users.clone(),
            organizations: store.organizations.clone(),
        }
    }

    /// Создать пользователя, вернуть назначенный id
    pub async fn create(&self, name: &str, username: &str, email: &str) -> ServiceResult<RecordId> {
        validate_credentials(username, email)?;

        // username сравнивается со всеми записями, email — только с неудалёнными
        let existing = self
            .users
            .find_first(&|u: &User| u.username == username || (u.email == email && u.is_live()))
            .await?;
        if existing.is_some() {
            warn!(username, "username or email already taken");
            return Err(ServiceError::already_exists(USER_TAKEN));
        }

        let user = self.users.insert(User::new(name, username, email, unix_now())).await?;

        info!(user_id = user.id, username, "user created");
        Ok(user.id)
    }

    pub async fn get(&self, id: RecordId) -> ServiceResult<User> {
        debug!(user_id = id, "get user");
        self.find_live(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(USER_NOT_FOUND))
    }

    /// Список неудалённых пользователей с поиском по name/username/email
    pub async fn query(&self, params: &QueryParams) -> ServiceResult<QueryResult<User>> {
        let spec = params.to_spec()?;
        let page = self.users.query(&spec).await?;

        debug!(
            total = page.total,
            returned = page.items.len(),
            page = params.page,
            "users queried"
        );
        Ok(QueryResult::from_page(page, params))
    }

    pub async fn update(
        &self,
        id: RecordId,
        name: &str,
        username: &str,
        email: &str,
    ) -> ServiceResult<String> {
        let mut user = self.get(id).await?;
        validate_credentials(username, email)?;

        user.apply_changes(name.to_string(), username.to_string(), email.to_string(), unix_now());
        self.users.update(&user).await?;

        info!(user_id = id, "user updated");
        Ok(USER_UPDATED.to_string())
    }

    /// Мягкое удаление
    pub async fn delete(&self, id: RecordId) -> ServiceResult<String> {
        let mut user = self.get(id).await?;

        user.mark_deleted(unix_now());
        self.users.update(&user).await?;

        info!(user_id = id, "user deleted");
        Ok(USER_DELETED.to_string())
    }

    /// Привязать пользователя к организации.
    ///
    /// Никогда не возвращает ошибку: результат, включая сбои хранилища,
    /// передаётся текстом сообщения.
    pub async fn associate_user_to_organization(
        &self,
        user_id: RecordId,
        organization_id: RecordId,
    ) -> String {
        match self.try_associate(user_id, organization_id).await {
            Ok(true) => {
                info!(user_id, organization_id, "user associated with organization");
                USER_ASSOCIATED.to_string()
            }
            Ok(false) => {
                warn!(user_id, organization_id, "association target missing");
                USER_OR_ORGANIZATION_NOT_FOUND.to_string()
            }
            Err(e) => {
                warn!(user_id, organization_id, error = %e, "association failed");
                format!("Failed to associate user: {}", e)
            }
        }
    }

    /// Отвязать пользователя от организации; ошибки — текстом сообщения
    pub async fn disassociate_user_from_organization(&self, user_id: RecordId) -> String {
        match self.try_disassociate(user_id).await {
            Ok(true) => {
                info!(user_id, "user disassociated from organization");
                USER_DISASSOCIATED.to_string()
            }
            Ok(false) => {
                warn!(user_id, "disassociation target missing");
                USER_NOT_FOUND.to_string()
            }
            Err(e) => {
                warn!(user_id, error = %e, "disassociation failed");
                format!("Failed to disassociate user: {}", e)
            }
        }
    }

    async fn try_associate(
        &self,
        user_id: RecordId,
        organization_id: RecordId,
    ) -> ServiceResult<bool> {
        let Some(mut user) = self.find_live(user_id).await? else {
            return Ok(false);
        };
        let organization = self.organizations.find_by_id(organization_id).await?;
        if !organization.is_some_and(|o| o.is_live()) {
            return Ok(false);
        }

        user.set_organization(Some(organization_id), unix_now());
        self.users.update(&user).await?;
        Ok(true)
    }

    async fn try_disassociate(&self, user_id: RecordId) -> ServiceResult<bool> {
        let Some(mut user) = self.find_live(user_id).await? else {
            return Ok(false);
        };

        user.set_organization(None, unix_now());
        self.users.update(&user).await?;
        Ok(true)
    }

    async fn find_live(&self, id: RecordId) -> ServiceResult<Option<User>> {
        Ok(self.users.find_by_id(id).await?.filter(User::is_live))
    }
}

fn validate_credentials(username: &str, email: &str) -> ServiceResult<()> {
    if is_blank(username) || is_blank(email) {
        warn!("rejected user without username or email");
        return Err(ServiceError::invalid_argument(CREDENTIALS_REQUIRED));
    }
    if !is_valid_email(email) {
        warn!(email, "rejected invalid email");
        return Err(ServiceError::invalid_argument(INVALID_EMAIL));
    }
    Ok(())
}
