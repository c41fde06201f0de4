// Service exports
pub mod cache;
pub mod postgres;
pub mod session;

pub use cache::{CacheManager, CacheKey, CacheError};
pub use postgres::{PostgresClient, PostgresError};
pub use session::{Session, SessionClaims, SessionError, SessionVerifier};
