//! Command line surface over `invoicepro_core`.
//!
//! # Responsibility
//! - Inspect active records, trash and activity for one user.
//! - Run trash maintenance with explicit `--yes` gates on irreversible steps.
//!
//! # Invariants
//! - Records are only mutated after the caller's ownership is checked.
//! - Output is JSON on stdout; diagnostics go to the log file when enabled.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use invoicepro_core::config::DEFAULT_STORAGE_KEY;
use invoicepro_core::{
    default_log_level, init_logging, ActivityService, CollectionName, CollectionService,
    DocumentRepository, DocumentStore, NewActivity, SqliteSlotStorage, StoreConfig, StoreError,
    TrashService,
};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "invoicepro", version, about = "Inspect and maintain a local InvoicePro store")]
struct Cli {
    /// SQLite file holding the persisted document.
    #[arg(long, env = "INVOICEPRO_DB", default_value = "invoicepro.db")]
    db: PathBuf,

    /// Slot key the document lives under.
    #[arg(long, default_value = DEFAULT_STORAGE_KEY)]
    storage_key: String,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "INVOICEPRO_LOG_DIR")]
    log_dir: Option<String>,

    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dashboard counters for a user
    Stats {
        #[arg(long)]
        user: String,
    },
    /// Active records of a collection
    List {
        collection: CollectionName,
        #[arg(long)]
        user: String,
    },
    /// Trash maintenance
    Trash {
        #[command(subcommand)]
        action: TrashCommand,
    },
    /// Most recent activity entries
    Activities {
        #[arg(long)]
        user: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Discard the whole persisted document
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum TrashCommand {
    /// Trashed records of a collection
    List {
        collection: CollectionName,
        #[arg(long)]
        user: String,
    },
    /// Trashed record counts per collection
    Counts {
        #[arg(long)]
        user: String,
    },
    /// Move an active record to the trash
    Move {
        collection: CollectionName,
        id: String,
        #[arg(long)]
        user: String,
    },
    /// Return a trashed record to the active set
    Restore {
        collection: CollectionName,
        id: String,
        #[arg(long)]
        user: String,
    },
    /// Permanently delete one trashed record
    Purge {
        collection: CollectionName,
        id: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        yes: bool,
    },
    /// Permanently delete every trashed record of a collection
    Empty {
        collection: CollectionName,
        #[arg(long)]
        user: String,
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(&cli.log_level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let storage = SqliteSlotStorage::open(&cli.db)
        .with_context(|| format!("failed to open store at `{}`", cli.db.display()))?;
    let store = DocumentStore::new(
        storage,
        StoreConfig::default().with_storage_key(cli.storage_key.as_str()),
    );

    run(&store, cli.command).map_err(|err| {
        let corrupt = matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Corrupt { .. })
        );
        if corrupt {
            err.context("stored document is unreadable; back it up before `invoicepro reset --yes`")
        } else {
            err
        }
    })
}

fn run(store: &DocumentStore<SqliteSlotStorage>, command: Command) -> anyhow::Result<()> {
    let collections = CollectionService::new(store);
    let activity = ActivityService::new(store);

    match command {
        Command::Stats { user } => print_json(&collections.dashboard_stats(&user)?),
        Command::List { collection, user } => {
            print_json(&collections.user_collection(collection, &user)?)
        }
        Command::Activities { user, limit } => {
            print_json(&activity.recent_activities(&user, limit)?)
        }
        Command::Reset { yes } => {
            require_confirmation(yes, "reset")?;
            store.reset()?;
            info!("event=cli_reset module=cli status=ok");
            print_json(&store.load()?.version)
        }
        Command::Trash { action } => run_trash(store, action),
    }
}

fn run_trash(store: &impl DocumentRepository, action: TrashCommand) -> anyhow::Result<()> {
    let collections = CollectionService::new(store);
    let trash = TrashService::new(store);
    let activity = ActivityService::new(store);

    match action {
        TrashCommand::List { collection, user } => {
            print_json(&trash.trash_items(&user, collection)?)
        }
        TrashCommand::Counts { user } => print_json(&trash.trash_counts(&user)?),
        TrashCommand::Move {
            collection,
            id,
            user,
        } => {
            if collections
                .find_user_record(collection, &user, &id)?
                .is_none()
            {
                bail!("no active {collection} record `{id}` for user `{user}`");
            }
            ensure_applied(trash.move_to_trash(collection, &id)?, "move", collection, &id)?;
            activity.add_activity(NewActivity::new(
                &user,
                trashed_kind(collection),
                "Item Trashed",
                format!("Moved {id} from {collection} to trash"),
            ));
            print_json(&trash.trash_counts(&user)?)
        }
        TrashCommand::Restore {
            collection,
            id,
            user,
        } => {
            ensure_in_trash(&trash, collection, &user, &id)?;
            ensure_applied(trash.restore_from_trash(collection, &id)?, "restore", collection, &id)?;
            activity.add_activity(NewActivity::new(
                &user,
                "item_restored",
                "Item Restored",
                format!("Restored item from {collection}"),
            ));
            print_json(&trash.trash_counts(&user)?)
        }
        TrashCommand::Purge {
            collection,
            id,
            user,
            yes,
        } => {
            require_confirmation(yes, "purge")?;
            ensure_in_trash(&trash, collection, &user, &id)?;
            ensure_applied(trash.permanent_delete(collection, &id)?, "purge", collection, &id)?;
            activity.add_activity(NewActivity::new(
                &user,
                "item_purged",
                "Item Deleted",
                format!("Permanently deleted {id} from {collection}"),
            ));
            print_json(&trash.trash_counts(&user)?)
        }
        TrashCommand::Empty {
            collection,
            user,
            yes,
        } => {
            require_confirmation(yes, "empty")?;
            let report = trash.empty_trash(&user, collection)?;
            if report.purged > 0 {
                activity.add_activity(NewActivity::new(
                    &user,
                    "trash_emptied",
                    "Trash Emptied",
                    format!("{} items deleted permanently from {collection}", report.purged),
                ));
            }
            print_json(&report)
        }
    }
}

fn ensure_in_trash(
    trash: &TrashService<impl DocumentRepository>,
    collection: CollectionName,
    user: &str,
    id: &str,
) -> anyhow::Result<()> {
    let in_trash = trash
        .trash_items(user, collection)?
        .iter()
        .any(|record| record.id() == id);
    if !in_trash {
        bail!("no trashed {collection} record `{id}` for user `{user}`");
    }
    Ok(())
}

fn ensure_applied(
    applied: bool,
    action: &str,
    collection: CollectionName,
    id: &str,
) -> anyhow::Result<()> {
    if !applied {
        bail!("{action} failed: {collection} record `{id}` no longer exists");
    }
    Ok(())
}

fn require_confirmation(yes: bool, action: &str) -> anyhow::Result<()> {
    if !yes {
        bail!("`{action}` cannot be undone; pass --yes to confirm");
    }
    Ok(())
}

fn trashed_kind(collection: CollectionName) -> &'static str {
    match collection {
        CollectionName::Clients => "client_trashed",
        CollectionName::Invoices => "invoice_trashed",
        CollectionName::Products => "product_trashed",
        CollectionName::Categories => "category_trashed",
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
