//! Authentication plumbing for the lockgate API

pub mod jwt;
pub mod password;
pub mod session;

pub use jwt::{Claims, JwtManager};
pub use password::{hash_password, verify_password};
pub use session::{CookieSession, SESSION_COOKIE};
