pub mod authz;
pub mod config;
pub mod errors;
pub mod models;
pub mod session;
pub mod utils;

// Re-export commonly used items for tests
pub use authz::{PermissionProvider, Permissions, PlantId, UserAuthProfile};
pub use errors::{AuthzError, AuthzResult};
