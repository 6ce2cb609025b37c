// src/store/query.rs

use crate::store::Record;

/// Порядок выдачи в запросах
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Name,
    /// Время создания, сравнивается как текст
    CreatedAt,
}

impl SortOrder {
    /// `"Name"` (с учётом регистра) — по имени, всё остальное — по времени создания
    pub fn from_order_by(order_by: &str) -> Self {
        if order_by == "Name" {
            SortOrder::Name
        } else {
            SortOrder::CreatedAt
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub search: Option<String>,
    pub order: SortOrder,
    pub offset: usize,
    pub limit: usize,
}

/// Страница результатов; `total` — число совпадений до пагинации
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl QuerySpec {
    /// Применить запрос к полному набору записей коллекции
    pub fn apply<T: Record>(&self, mut rows: Vec<T>) -> Page<T> {
        rows.sort_by_key(|r| r.id());

        let mut matching: Vec<T> = rows
            .into_iter()
            .filter(|r| r.status().is_active())
            .filter(|r| match self.search.as_deref() {
                Some(needle) => r.matches(needle),
                None => true,
            })
            .collect();

        let total = matching.len();

        // стабильная сортировка: при равных ключах сохраняется порядок id
        matching.sort_by_cached_key(|r| r.sort_key(self.order));

        let items = matching
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect();

        Page { items, total }
    }
}
