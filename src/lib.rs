// src/lib.rs

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

#[cfg(feature = "grpc")]
pub mod grpc;

pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use services::{OrganizationService, QueryParams, QueryResult, UserService};
pub use store::Store;
