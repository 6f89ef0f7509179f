use super::open_store;
use crate::config::Config;
use crate::services::auth_service::MIN_PASSWORD_LEN;

pub async fn cmd_reset_password(
    config: &Config,
    username: &str,
    new_password: &str,
) -> anyhow::Result<()> {
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        anyhow::bail!("Password must be at least {MIN_PASSWORD_LEN} characters");
    }

    let store = open_store(config).await?;
    if store.get_user_by_username(username).await?.is_none() {
        anyhow::bail!("User not found: {username}");
    }

    store.update_user_password(username, new_password).await?;
    println!("✓ Password updated for {username}");
    Ok(())
}
