mod admin;
mod api_tokens;
mod auth;
mod health_check;
mod users;

pub use admin::{grant_admin, list_users};
pub use api_tokens::{create_api_token, delete_all_api_tokens, delete_api_token, list_api_tokens, whoami};
pub use auth::{get_current_user, login, logout, register};
pub use health_check::health_check;
pub use users::{change_full_name, change_password, delete_account, UserResponse};
