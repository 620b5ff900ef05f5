//! Operator command-line interface.
//!
//! Drives the same registry service the HTTP admin API uses, against the
//! configured storage backend.

use clap::Subcommand;
use colored::Colorize;

use crate::errors::Result;
use crate::services::{LinkService, RedirectService};
use crate::storages::StorageFactory;
use crate::storages::feed::order_snapshot;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered links, optionally filtered by an id substring
    List { term: Option<String> },
    /// Register a new redirect target under a generated id
    Add { url: String },
    /// Point an existing link at a new target
    Update { id: String, url: String },
    /// Delete a link
    Remove { id: String },
    /// Resolve an id the way the public endpoint would (counts one access)
    Resolve { id: String },
}

pub async fn run(command: Command) -> Result<()> {
    let storage = StorageFactory::create().await?;
    let service = LinkService::new(storage.clone());

    match command {
        Command::List { term } => {
            let snapshot = order_snapshot(storage.load_all().await.into_values().collect());
            let links = LinkService::search(&snapshot, term.as_deref().unwrap_or(""));

            if links.is_empty() {
                println!("{} no links registered", "ℹ".blue().bold());
            } else {
                for link in &links {
                    println!(
                        "  {} -> {} {}",
                        link.id.cyan(),
                        link.url.blue(),
                        format!("({} hits)", link.access_count).dimmed()
                    );
                }
                println!();
                println!(
                    "{} {} links",
                    "ℹ".blue().bold(),
                    links.len().to_string().green()
                );
            }
        }
        Command::Add { url } => {
            let record = service.create_link(&url).await?;
            println!(
                "{} added link: {} -> {}",
                "✓".green().bold(),
                record.id.cyan(),
                record.url.blue()
            );
            println!(
                "  resolution path: {}",
                LinkService::resolution_path(&record.id).magenta()
            );
        }
        Command::Update { id, url } => {
            service.edit_link(&id, &url).await?;
            println!(
                "{} updated link: {} -> {}",
                "✓".green().bold(),
                id.cyan(),
                url.blue()
            );
        }
        Command::Remove { id } => {
            service.delete_link(&id).await?;
            println!("{} removed link: {}", "✓".green().bold(), id.cyan());
        }
        Command::Resolve { id } => {
            let target = RedirectService::resolve(storage.as_ref(), &id).await?;
            println!("{}", target);
        }
    }

    Ok(())
}
