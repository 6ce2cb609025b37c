// src/services/mod.rs

pub mod organization;
pub mod user;
pub mod validation;

pub use organization::OrganizationService;
pub use user::UserService;

use crate::error::{ServiceError, ServiceResult};
use crate::store::{Page, QuerySpec, SortOrder};

/// Параметры запроса списка (как на проводе)
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pub query_string: String,
    pub order_by: String,
    pub page: i32,
    pub page_size: i32,
}

impl QueryParams {
    pub fn new(query_string: impl Into<String>, order_by: impl Into<String>, page: i32, page_size: i32) -> Self {
        Self {
            query_string: query_string.into(),
            order_by: order_by.into(),
            page,
            page_size,
        }
    }

    /// Проверить параметры и перевести в запрос к хранилищу
    fn to_spec(&self) -> ServiceResult<QuerySpec> {
        if self.page < 1 {
            return Err(ServiceError::invalid_argument("Page must be greater than zero."));
        }
        if self.page_size < 1 {
            return Err(ServiceError::invalid_argument("Page size must be greater than zero."));
        }

        let offset = (i64::from(self.page) - 1) * i64::from(self.page_size);
        let search = if validation::is_blank(&self.query_string) {
            None
        } else {
            Some(self.query_string.clone())
        };

        Ok(QuerySpec {
            search,
            order: SortOrder::from_order_by(&self.order_by),
            offset: usize::try_from(offset).unwrap_or(usize::MAX),
            limit: self.page_size as usize,
        })
    }
}

/// Страница ответа с эхом параметров пагинации
#[derive(Debug, Clone)]
pub struct QueryResult<T> {
    pub items: Vec<T>,
    pub page: i32,
    pub page_size: i32,
    pub total: i32,
}

impl<T> QueryResult<T> {
    fn from_page(page: Page<T>, params: &QueryParams) -> Self {
        Self {
            items: page.items,
            page: params.page,
            page_size: params.page_size,
            total: i32::try_from(page.total).unwrap_or(i32::MAX),
        }
    }
}
