//! User and role administration.

mod api;
mod error;
mod model;
mod store;
mod validate;

pub use api::{AdminApi, HttpAdminApi};
pub use error::{AdminError, AdminResult};
pub use model::{NewRole, NewUser, Role, RoleUpdate, User, UserUpdate};
pub use store::AdminStore;
pub use validate::{validate_email, validate_password, validate_role_name, validate_username};
