//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Token issuance, refresh, password change and bearer verification live
//! here; HTTP concerns stay in the server crate.

pub mod claims;
pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;
pub mod tokens;

pub use service::AuthService;
