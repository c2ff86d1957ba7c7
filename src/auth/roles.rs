/// Well-known role names.
///
/// Roles are plain string labels with no hierarchy: holding `ADMIN` does
/// not imply `EDITOR` unless a route lists both.

pub const ADMIN: &str = "Admin";
pub const EDITOR: &str = "Editor";
pub const USER: &str = "User";
