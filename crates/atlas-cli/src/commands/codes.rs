//! Flag code resolution per catalog entry

use anyhow::Result;
use atlas_gen::providers::iso::IsoCountryTable;
use atlas_gen::{Catalog, IdentifierResolver, ResolvedVia};
use std::path::Path;

pub fn run(config_path: Option<&str>, catalog_path: Option<&str>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let catalog_path = catalog_path
        .map(Path::new)
        .or(config.pipeline.catalog.as_deref());
    let catalog = Catalog::load_or_builtin(catalog_path)?;
    let resolver =
        IdentifierResolver::new(Box::new(IsoCountryTable::new())).with_overrides(&config.codes);

    let mut unresolved = 0;
    for entity in catalog.iter() {
        match resolver.resolve_with_source(&entity.key) {
            Some((code, via)) => {
                let via = match via {
                    ResolvedVia::Lookup => "lookup",
                    ResolvedVia::Override => "override",
                    ResolvedVia::Substring => "substring",
                };
                println!("  {:<28} {}  ({})", entity.key, code, via);
            }
            None => {
                unresolved += 1;
                println!("  {:<28} --  (unresolved, placeholder flag)", entity.key);
            }
        }
    }

    println!(
        "\n{} resolved, {} unresolved",
        catalog.len() - unresolved,
        unresolved
    );
    Ok(())
}
