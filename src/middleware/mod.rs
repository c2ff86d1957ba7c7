mod jwt_middleware;
mod roles;

pub use jwt_middleware::RequireAuth;
pub use roles::has_permitted_role;
pub use roles::RequireRoles;
