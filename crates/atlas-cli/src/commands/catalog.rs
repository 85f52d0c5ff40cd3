//! Catalog listing

use anyhow::Result;
use atlas_gen::Catalog;
use std::path::Path;

pub fn run(config_path: Option<&str>, catalog_path: Option<&str>, format: &str) -> Result<()> {
    let catalog = match catalog_path {
        Some(p) => Catalog::load(Path::new(p))?,
        None => {
            let config = super::load_config(config_path)?;
            Catalog::load_or_builtin(config.pipeline.catalog.as_deref())?
        }
    };

    if catalog.is_empty() {
        println!("Catalog is empty.");
        return Ok(());
    }

    if format == "json" {
        let items: Vec<serde_json::Value> = catalog
            .iter()
            .map(|entity| {
                serde_json::json!({
                    "key": entity.key,
                    "capital": entity.capital,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        println!("{} entries:\n", catalog.len());
        for entity in catalog.iter() {
            println!("  {:<28} {}", entity.key, entity.capital);
        }
    }
    Ok(())
}
