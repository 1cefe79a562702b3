use eyre::{Result, WrapErr};
use packbridge_compiler::{CacheListItem, Compiler};
use packbridge_config::Settings;

pub async fn cache(settings: Settings, bundles: Vec<String>) -> Result<()> {
    let cache_file = settings.cache_file_path()?;
    let compiler = Compiler::new(settings)?;

    let document = if bundles.is_empty() {
        compiler.populate_cache_from_settings().await
    } else {
        compiler
            .populate_cache(bundles.into_iter().map(CacheListItem::from))
            .await
    }
    .wrap_err("failed to populate the cache file")?;

    println!("Populated cache file {}", cache_file.display());
    for (key, entry) in &document {
        println!("{key}");
        println!("  config: {}", entry.config().display());
        for asset in entry.data.assets.by_entry().into_iter().flat_map(|(_, assets)| assets) {
            println!("  asset: {}", asset.name);
        }
    }

    Ok(())
}

pub async fn manifest(settings: Settings) -> Result<()> {
    let manifest_path = settings.manifest_file_path()?;
    let compiler = Compiler::new(settings)?;

    let manifest = compiler
        .populate_manifest()
        .await
        .wrap_err("failed to populate the manifest")?;

    println!(
        "Manifest with {} entries written to {}",
        manifest.len(),
        manifest_path.display()
    );
    Ok(())
}
