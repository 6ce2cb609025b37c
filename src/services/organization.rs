// src/services/organization.rs

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::models::{unix_now, Organization, RecordId};
use crate::services::validation::is_blank;
use crate::services::{QueryParams, QueryResult};
use crate::store::{Repository, Store};

pub const ORGANIZATION_UPDATED: &str = "Organization updated successfully.";
pub const ORGANIZATION_DELETED: &str = "Organization deleted successfully.";

const NAME_REQUIRED: &str = "Organization name is required.";
const NAME_TAKEN: &str = "Organization with this name already exists.";
const NOT_FOUND: &str = "Organization not found.";

/// Сервис организаций
#[derive(Clone)]
pub struct OrganizationService {
    organizations: Arc<dyn Repository<Organization>>,
}

impl OrganizationService {
    pub fn new(store: &Store) -> Self {
        Self {
            organizations: store.organizations.clone(),
        }
    }

    /// Создать организацию, вернуть назначенный id
    pub async fn create(&self, name: &str, address: &str) -> ServiceResult<RecordId> {
        if is_blank(name) {
            warn!("rejected organization without name");
            return Err(ServiceError::invalid_argument(NAME_REQUIRED));
        }

        // Имя уникально только среди неудалённых
        let existing = self
            .organizations
            .find_first(&|o: &Organization| o.is_live() && o.name == name)
            .await?;
        if existing.is_some() {
            warn!(name, "organization name already taken");
            return Err(ServiceError::already_exists(NAME_TAKEN));
        }

        let organization = Organization::new(name, Some(address.to_string()), unix_now());
        let organization = self.organizations.insert(organization).await?;

        info!(organization_id = organization.id, name, "organization created");
        Ok(organization.id)
    }

    pub async fn get(&self, id: RecordId) -> ServiceResult<Organization> {
        debug!(organization_id = id, "get organization");
        self.find_live(id).await
    }

    /// Список неудалённых организаций с поиском по name/address
    pub async fn query(&self, params: &QueryParams) -> ServiceResult<QueryResult<Organization>> {
        let spec = params.to_spec()?;
        let page = self.organizations.query(&spec).await?;

        debug!(
            total = page.total,
            returned = page.items.len(),
            page = params.page,
            "organizations queried"
        );
        Ok(QueryResult::from_page(page, params))
    }

    pub async fn update(&self, id: RecordId, name: &str, address: &str) -> ServiceResult<String> {
        let mut organization = self.find_live(id).await?;

        if is_blank(name) {
            warn!(organization_id = id, "rejected update without name");
            return Err(ServiceError::invalid_argument(NAME_REQUIRED));
        }

        organization.apply_changes(name.to_string(), Some(address.to_string()), unix_now());
        self.organizations.update(&organization).await?;

        info!(organization_id = id, "organization updated");
        Ok(ORGANIZATION_UPDATED.to_string())
    }

    /// Мягкое удаление
    pub async fn delete(&self, id: RecordId) -> ServiceResult<String> {
        let mut organization = self.find_live(id).await?;

        organization.mark_deleted(unix_now());
        self.organizations.update(&organization).await?;

        info!(organization_id = id, "organization deleted");
        Ok(ORGANIZATION_DELETED.to_string())
    }

    async fn find_live(&self, id: RecordId) -> ServiceResult<Organization> {
        match self.organizations.find_by_id(id).await? {
            Some(organization) if organization.is_live() => Ok(organization),
            _ => Err(ServiceError::not_found(NOT_FOUND)),
        }
    }
}
