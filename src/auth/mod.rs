pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod session;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{ActiveSession, SessionGate, LOGIN_PATH};
pub use session::{Session, SessionContext};
