mod token_blacklist_repository;
mod user_repository;

pub use token_blacklist_repository::{PgTokenBlacklistRepository, TokenBlacklistRepository};
pub use user_repository::{PgUserRepository, UserRepository, DUPLICATE_USERNAME};
