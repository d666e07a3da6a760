//! User accounts: models, persistence and signup/login.

mod models;
mod repository;
mod service;

pub use models::{CreateUser, LoginRequest, SignupRequest, User, UserInfo, UserRole};
pub use repository::UserRepository;
pub use service::UserService;
