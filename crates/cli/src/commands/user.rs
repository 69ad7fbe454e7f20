//! Account management command.

use pvz_core::User;
use pvz_server::auth::AuthService;
use pvz_server::db::PgStore;

use super::{CommandError, connect};

/// Create a password account, with the same validation as `POST /register`.
pub async fn create(email: &str, password: &str, role: &str) -> Result<User, CommandError> {
    let store = PgStore::new(connect().await?);
    let user = AuthService::new(&store)
        .register(email, password, role)
        .await?;
    Ok(user)
}
