// src/models/mod.rs

pub mod status;
pub mod organization;
pub mod user;

// Re-exports

pub use status::RecordStatus;
pub use organization::Organization;
pub use user::User;

/// Идентификатор записи, выдаётся хранилищем (int32 на проводе)
pub type RecordId = i32;

/// Текущее время в Unix-секундах
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
