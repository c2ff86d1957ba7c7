/// Authentication primitives
///
/// JWT issuing/verification and password hashing. The session lifecycle
/// handlers in `routes::auth` orchestrate these against the user store.

mod claims;
mod jwt;
mod password;
pub mod roles;

pub use claims::AccessClaims;
pub use claims::RefreshClaims;
pub use jwt::decode_access_token;
pub use jwt::decode_refresh_token;
pub use jwt::issue_access_token;
pub use jwt::issue_refresh_token;
pub use jwt::TokenError;
pub use password::hash_password;
pub use password::verify_password;
