mod list;
mod password;

pub use list::cmd_list_anime;
pub use password::cmd_reset_password;

use crate::config::Config;
use crate::db::Store;

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
        config.security.clone(),
    )
    .await
}
