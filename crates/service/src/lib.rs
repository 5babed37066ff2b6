//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Runs parent and attachment writes as one unit of work.

pub mod errors;
pub mod attachments;
pub mod auth;
pub mod deletion;
pub mod haircut_service;
pub mod pagination;
pub mod password;
pub mod runtime;
pub mod storage;
pub mod upsert;
pub mod user_service;
pub mod views;
#[cfg(test)]
pub mod test_support;

pub use haircut_service::HairCutService;
pub use user_service::{UserInput, UserService};
