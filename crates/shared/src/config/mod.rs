mod database;
mod jwt;

pub use self::database::{ConnectionManager, ConnectionPool, IsolationLevel};
pub use self::jwt::{Claims, JwtConfig};
