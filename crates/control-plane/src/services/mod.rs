// Services layer for business logic
// Services own business logic and validation, calling storage directly

pub mod auth;

pub use auth::AuthService;
