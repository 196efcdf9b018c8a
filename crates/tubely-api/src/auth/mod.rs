pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{AccessClaims, JwtService};
pub use middleware::{auth_middleware, AuthState};
pub use models::AuthenticatedUser;
