use anyhow::{Context, Result};
use grid_model::{FarmId, SubtableId, SurveyKey};
use grid_schema::{CsvCatalog, FileStore, MetadataSource, try_assemble, try_resolve};
use grid_server::{AppState, grid_endpoint};
use tokio::net::TcpListener;
use tracing::info;

use grid_cli::config::Settings;
use grid_cli::report::{description_table, error_count, issues_table, subtables_table};

use crate::cli::{ResolveArgs, SubtablesArgs};

fn load_catalog(settings: &Settings) -> Result<CsvCatalog> {
    let root = &settings.metadata_root;
    let catalog = CsvCatalog::load(root)
        .with_context(|| format!("load metadata from {}", root.display()))?;
    info!(root = %root.display(), years = ?catalog.years(), "metadata loaded");
    Ok(catalog)
}

pub fn run_serve(settings: &Settings) -> Result<()> {
    let catalog = load_catalog(settings)?;
    let store = FileStore::new(&settings.data_root);
    let state = AppState::new(catalog, store);
    let runtime = tokio::runtime::Runtime::new().context("start async runtime")?;
    runtime.block_on(async {
        let listener = TcpListener::bind(settings.listen)
            .await
            .with_context(|| format!("bind {}", settings.listen))?;
        grid_server::serve(listener, state).await.context("serve")
    })
}

pub fn run_resolve(args: &ResolveArgs, settings: &Settings) -> Result<()> {
    let catalog = load_catalog(settings)?;
    let subtable = SubtableId::new(args.subtable.as_str())?;
    let record = catalog
        .subtable(args.year, &subtable)
        .with_context(|| format!("subtable {subtable} of {}", args.year))?;

    let description = match &args.farm {
        Some(farm) => {
            let key = SurveyKey::new(args.year, FarmId::new(farm.as_str())?, subtable.clone());
            let endpoint = grid_endpoint(args.year, farm, &record.table, subtable.as_str());
            let store = FileStore::new(&settings.data_root);
            try_assemble(&catalog, &store, &key, &endpoint)?
        }
        None => try_resolve(&catalog, args.year, &subtable)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&description)?);
        return Ok(());
    }
    println!("{}", record.display_name());
    println!("Layout: {}", description.variant);
    if !description.catalogue.is_empty() {
        println!("Catalogue: {} codes", description.catalogue.len());
    }
    println!("{}", description_table(&description));
    Ok(())
}

pub fn run_subtables(args: &SubtablesArgs, settings: &Settings) -> Result<()> {
    let catalog = load_catalog(settings)?;
    let records = catalog.subtables(args.year)?;
    println!("{}", subtables_table(&records));
    Ok(())
}

/// Print catalog issues and return the number of errors.
pub fn run_check(settings: &Settings) -> Result<usize> {
    let catalog = load_catalog(settings)?;
    let issues = catalog.check();
    if issues.is_empty() {
        println!("No issues found.");
        return Ok(0);
    }
    println!("{}", issues_table(&issues));
    let errors = error_count(&issues);
    println!("{errors} errors, {} warnings", issues.len() - errors);
    Ok(errors)
}
