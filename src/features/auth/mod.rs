pub mod dtos;
pub mod handlers;
pub mod model;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::{AuthService, PasswordHasher, TokenService};
