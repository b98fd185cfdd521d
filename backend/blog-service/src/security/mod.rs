/// Credential handling: argon2 password hashes and HS256 session tokens
pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtKeys, TokenPair};
