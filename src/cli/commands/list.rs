//! List anime command handler

use super::open_store;
use crate::config::Config;

pub async fn cmd_list_anime(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let anime_list = store.list_all_anime().await?;

    if anime_list.is_empty() {
        println!("No anime in the catalogue yet.");
        println!();
        println!("Add one with: POST /api/anime");
        return Ok(());
    }

    let ids: Vec<_> = anime_list.iter().map(|a| a.id.clone()).collect();
    let comment_counts = store.get_comment_counts_for_anime_ids(&ids).await?;

    println!("Anime ({} total)", anime_list.len());
    println!("{:-<70}", "");

    for anime in anime_list {
        let episodes = anime.videos().len();
        let comments = comment_counts.get(&anime.id).copied().unwrap_or(0);

        println!("• {} [{} eps, {} comments]", anime.title, episodes, comments);
        println!("  ID: {} | Added: {}", anime.id, anime.created_at);
    }

    Ok(())
}
