//! Deck and model identifiers

use anyhow::Result;
use atlas_gen::allocate_all;
use atlas_gen::config::parse_language_list;

pub fn run(config_path: Option<&str>, languages: Option<&str>) -> Result<()> {
    let languages = match languages {
        Some(list) => parse_language_list(list),
        None => super::load_config(config_path)?.pipeline.languages,
    };
    if languages.is_empty() {
        println!("No languages configured.");
        return Ok(());
    }

    let ids = allocate_all(&languages)?;
    println!("{} language(s):\n", ids.len());
    for entry in &ids {
        println!(
            "  {:<6} deck {:<12} model {}",
            entry.language, entry.deck_id, entry.model_id
        );
    }
    Ok(())
}
