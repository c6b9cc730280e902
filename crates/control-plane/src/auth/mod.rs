// Authentication module
// Decision: Username/password accounts, stateless HS256 bearer tokens

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod routes;

pub use config::{AuthConfig, JwtConfig};
pub use error::AuthError;
pub use jwt::{JwtService, TokenClaims};
pub use middleware::{require_auth, AuthState, AuthUser};
pub use routes::routes;
