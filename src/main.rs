use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dexbinder::{
    load_config_from, Catalog, Collection, Config, DexbinderPaths, FileSource, FilterFlag, ImageField,
    PendingAction, Rarity, RecordPatch, SortMode, SqliteGateway,
};

#[derive(Parser)]
#[command(name = "dexbinder")]
#[command(author, version, about = "Personal card collection binder")]
struct Cli {
    /// Data directory (defaults to ~/.dexbinder)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the binder under the given filters
    List {
        #[arg(long, default_value = "dex")]
        sort: SortMode,
        #[arg(long)]
        search: Option<String>,
        /// Only owned entries
        #[arg(long, conflicts_with = "missing")]
        owned: bool,
        /// Only missing entries
        #[arg(long)]
        missing: bool,
        #[arg(long)]
        gen1_only: bool,
        /// Inclusive sort-id window, e.g. 1-50
        #[arg(long, value_parser = parse_range)]
        range: Option<(u32, u32)>,
        #[arg(long)]
        no_slots: bool,
        #[arg(long)]
        no_trainers: bool,
        /// Hide one rarity (repeatable)
        #[arg(long = "hide-rarity")]
        hide_rarity: Vec<Rarity>,
    },
    /// Flip ownership of an entry
    Toggle { key: String },
    /// Edit an entry's record
    Save {
        key: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        value: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        fan_art: Option<String>,
        #[arg(long)]
        dream: Option<String>,
        #[arg(long)]
        ideal: Option<String>,
        #[arg(long)]
        rarity: Option<Rarity>,
    },
    /// Add a duplicate slot under an entry
    AddSlot { parent: String },
    /// Remove a slot and its record
    RemoveSlot {
        key: String,
        #[arg(long)]
        yes: bool,
    },
    /// Swap a slot's record with its main entry
    Promote {
        key: String,
        #[arg(long)]
        yes: bool,
    },
    /// Add a manual entry
    AddExtra {
        #[arg(long)]
        name: String,
        #[arg(long)]
        id: u32,
        #[arg(long)]
        trainer: bool,
        #[arg(long)]
        url: Option<String>,
    },
    /// Add an entry from a later generation's dex
    AddFromDex {
        #[arg(long)]
        id: u32,
        #[arg(long)]
        url: Option<String>,
    },
    /// Delete an extra entry with its slots and records
    DeleteExtra {
        key: String,
        #[arg(long)]
        yes: bool,
    },
    /// Set the grid column count (0 = auto)
    Columns { count: u8 },
    /// Write a CSV backup
    Export { file: PathBuf },
    /// Restore from a CSV backup
    Import { file: PathBuf },
    /// Write a JSON snapshot of the records
    SnapshotExport { file: PathBuf },
    /// Replace the records from a JSON snapshot
    SnapshotImport { file: PathBuf },
    /// Completion summary
    Stats,
    /// Start a fresh collection
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

fn parse_range(s: &str) -> Result<(u32, u32), String> {
    let (low, high) = s
        .split_once('-')
        .ok_or_else(|| format!("expected LOW-HIGH, got '{}'", s))?;
    let low = low.trim().parse().map_err(|_| format!("bad lower bound '{}'", low))?;
    let high = high.trim().parse().map_err(|_| format!("bad upper bound '{}'", high))?;
    Ok((low, high))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = match &cli.home {
        Some(root) => DexbinderPaths::at(root),
        None => DexbinderPaths::new()?,
    };
    let config = load_config_from(&paths.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    paths.ensure_dirs()?;
    let mut collection = open_collection(&paths, &config)?;

    run(cli.command, &mut collection).await
}

fn open_collection(paths: &DexbinderPaths, config: &Config) -> Result<Collection> {
    let db_path = config.database_path(paths);
    let gateway = SqliteGateway::open(&db_path)
        .with_context(|| format!("Failed to open {}", db_path.display()))?;

    Ok(Collection::open(Catalog::gen1(), Box::new(gateway))?
        .with_filters(config.filters.clone())
        .with_import_mode(config.import_mode))
}

async fn run(command: Commands, collection: &mut Collection) -> Result<()> {
    match command {
        Commands::List {
            sort,
            search,
            owned,
            missing,
            gen1_only,
            range,
            no_slots,
            no_trainers,
            hide_rarity,
        } => {
            let mut filters = collection.filters().clone();
            if owned {
                filters.show_missing = false;
            }
            if missing {
                filters.show_owned = false;
            }
            filters.gen1_only |= gen1_only;
            filters.id_range = range.or(filters.id_range);
            filters.show_slots &= !no_slots;
            filters.show_trainers &= !no_trainers;
            if let Some(query) = search {
                filters.search = query;
            }
            for rarity in hide_rarity {
                filters.set_flag(FilterFlag::Rarity(rarity), false);
            }
            collection.set_filters(filters);
            collection.set_sort_mode(sort);
            print_list(collection);
        }
        Commands::Toggle { key } => {
            let owned = collection.toggle_owned(&key)?;
            println!("{} {}", if owned { "✓" } else { "○" }, key);
        }
        Commands::Save {
            key,
            name,
            value,
            url,
            fan_art,
            dream,
            ideal,
            rarity,
        } => {
            let mut patch = RecordPatch::new();
            patch.name = name;
            patch.value = value;
            patch.rarity = rarity;
            for (field, image) in [
                (ImageField::Primary, url),
                (ImageField::FanArt, fan_art),
                (ImageField::Dream, dream),
                (ImageField::Ideal, ideal),
            ] {
                if let Some(image) = image {
                    patch.set_image(field, image);
                }
            }
            let saved = collection.save_record(&key, &patch)?;
            println!("✓ Saved {} ({}, value {})", key, saved.rarity, saved.value.text());
        }
        Commands::AddSlot { parent } => {
            let slot = collection.add_slot(&parent)?;
            println!("✓ Added slot {}", slot);
        }
        Commands::RemoveSlot { key, yes } => {
            confirm(collection, PendingAction::RemoveSlot(key), yes)?;
        }
        Commands::Promote { key, yes } => {
            confirm(collection, PendingAction::PromoteSlot(key), yes)?;
        }
        Commands::AddExtra { name, id, trainer, url } => {
            let entry = collection.add_extra_manual(&name, Some(id), trainer, url)?;
            println!("✓ {} added as {}", entry.name, entry.key);
        }
        Commands::AddFromDex { id, url } => {
            let entry = collection.add_extra_from_dex(id, url)?;
            println!("✓ {} added as {}", entry.name, entry.key);
        }
        Commands::DeleteExtra { key, yes } => {
            confirm(collection, PendingAction::DeleteExtra(key), yes)?;
        }
        Commands::Columns { count } => {
            collection.set_grid_columns(count)?;
            println!("✓ Grid columns set to {}", count);
        }
        Commands::Export { file } => {
            let csv = collection.export_csv()?;
            fs::write(&file, csv).with_context(|| format!("Failed to write {}", file.display()))?;
            println!("✓ Backup written to {}", file.display());
        }
        Commands::Import { file } => {
            let summary = collection.import_csv_from(&FileSource::new(&file)).await?;
            println!("✓ Collection imported successfully! ({})", summary.mode);
            println!("   Records: {}", summary.records);
            println!("   Extras:  {}", summary.extras);
            println!("   Slotted: {}", summary.slot_parents);
        }
        Commands::SnapshotExport { file } => {
            let json = collection.export_snapshot()?;
            fs::write(&file, json).with_context(|| format!("Failed to write {}", file.display()))?;
            println!("✓ Snapshot written to {}", file.display());
        }
        Commands::SnapshotImport { file } => {
            let count = collection.import_snapshot_from(&FileSource::new(&file)).await?;
            println!("✓ Restored {} records", count);
        }
        Commands::Stats => {
            let stats = collection.stats();
            println!("📊 {}/{} owned ({}%)", stats.owned, stats.total, stats.percentage);
            println!("💰 Total value: ${:.2}", stats.total_value);
        }
        Commands::Clear { yes } => {
            confirm(collection, PendingAction::ClearAll, yes)?;
        }
    }

    Ok(())
}

/// Stage a destructive action and run it only with --yes
fn confirm(collection: &mut Collection, action: PendingAction, yes: bool) -> Result<()> {
    let prompt = collection.stage(action);
    if !yes {
        collection.cancel();
        println!("{}", prompt);
        bail!("refusing without --yes");
    }
    if collection.confirm()? {
        println!("✓ Done");
    } else {
        println!("○ Nothing to do: no matching entry");
    }
    Ok(())
}

fn print_list(collection: &Collection) {
    let view = collection.view();
    for entry in &view {
        let mark = if entry.is_owned() { "✓" } else { "○" };
        let value = entry.record.value.text();
        println!(
            "{} #{:<5} {:<28} {:<7} {:<7} {}",
            mark,
            entry.display_id,
            entry.display_name(),
            entry.category,
            entry.rarity(),
            value
        );
    }

    let stats = collection.stats();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{} shown · {}/{} owned ({}%)", view.len(), stats.owned, stats.total, stats.percentage);
}
