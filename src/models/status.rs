// src/models/status.rs

use serde::{Deserialize, Serialize};

/// Состояние записи: мягкое удаление всегда несёт метку времени
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordStatus {
    #[default]
    Active,
    Deleted { at: i64 },
}

impl RecordStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, RecordStatus::Active)
    }

    /// Время удаления, если запись удалена
    pub fn deleted_at(&self) -> Option<i64> {
        match self {
            RecordStatus::Active => None,
            RecordStatus::Deleted { at } => Some(*at),
        }
    }
}
