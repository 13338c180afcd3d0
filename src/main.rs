use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::env;
use std::path::Path;

use pt_municipalities::{
    source_digest, BankRegistryParser, CachedArtifact, CsvGeoSource, GeoSource,
    ReconciliationEngine, ResultCache, CACHE_KEY,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 5 {
        eprintln!(
            "Usage: {} <bp_list.tsv> <caop_municipalities.csv> <caop_districts.csv> <cache_dir>",
            args.first().map(String::as_str).unwrap_or("pt-municipalities")
        );
        bail!("expected 4 arguments, got {}", args.len().saturating_sub(1));
    }

    run_reconciliation(
        Path::new(&args[1]),
        Path::new(&args[2]),
        Path::new(&args[3]),
        Path::new(&args[4]),
    )
}

/// Force a full recomputation and repopulate the cache, bypassing any
/// cache-hit shortcut.
fn run_reconciliation(
    bank_path: &Path,
    municipalities_path: &Path,
    districts_path: &Path,
    cache_dir: &Path,
) -> Result<()> {
    println!("🏛️  Municipality NIF reconciliation");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Bank registry
    println!("\n📂 Loading bank registry...");
    let bank_data = std::fs::read_to_string(bank_path)
        .with_context(|| format!("failed to read bank registry {}", bank_path.display()))?;
    let records = BankRegistryParser::new().parse_str(&bank_data)?;
    println!("✓ Parsed {} bank records", records.len());

    // 2. Geographic registry
    println!("\n🌍 Loading geographic registry...");
    let geo = CsvGeoSource::new(municipalities_path, districts_path);
    let municipalities = geo.municipalities()?;
    let districts = geo.districts()?;
    println!(
        "✓ Loaded {} municipalities across {} districts",
        municipalities.len(),
        districts.len()
    );

    // 3. Reconcile
    println!("\n⚖️  Reconciling...");
    let engine = ReconciliationEngine::new();
    let reconciled = engine.reconcile(&records, &municipalities, &districts)?;
    println!("✓ Joined {} municipalities", reconciled.len());

    // 4. Persist
    println!("\n💾 Writing cache artifact...");
    let cache = ResultCache::new(cache_dir);
    let artifact = CachedArtifact {
        generated_at: Utc::now(),
        source_digest: source_digest(&bank_data),
        municipalities: reconciled,
    };
    cache.flush(CACHE_KEY)?;
    cache.store(CACHE_KEY, &artifact)?;
    println!(
        "✓ Stored {}.json (source digest {})",
        CACHE_KEY,
        &artifact.source_digest[..12]
    );

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Reconciliation complete");

    Ok(())
}
