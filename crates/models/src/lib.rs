//! SeaORM entities and store functions.
//!
//! Store functions are generic over `ConnectionTrait` so they run the same
//! against a pooled connection or inside a `DatabaseTransaction`.

pub mod errors;
pub mod db;
pub mod deletion;
pub mod haircut;
pub mod haircut_image;
pub mod user;
pub mod photo_user;
pub mod search;
