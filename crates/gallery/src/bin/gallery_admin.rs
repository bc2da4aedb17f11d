use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gallery::{Config, db::Repository, media};

/// Manage the photos served by the gallery backend.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy an image into the media root and register it
    Add {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        description: String,
        /// Image file to import (JPEG, PNG, GIF or WebP)
        image: PathBuf,
    },
    /// Print every stored photo in insertion order
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let repo = Repository::open(&config.gallery_db_file)?;

    match cli.command {
        Command::Add {
            title,
            description,
            image,
        } => add(&config, &repo, title, description, image).await,
        Command::List => list(&repo).await,
    }
}

async fn add(
    config: &Config,
    repo: &Repository,
    title: String,
    description: String,
    image: PathBuf,
) -> Result<()> {
    let imported =
        media::import_photo(repo, &config.gallery_media_root, title, description, &image).await?;

    let photo = imported.photo;
    println!(
        "added #{} {:?} ({}, {}x{})",
        photo.id, photo.title, photo.image, imported.width, imported.height
    );
    Ok(())
}

async fn list(repo: &Repository) -> Result<()> {
    for photo in repo.list_photos().await? {
        println!("#{}\t{}\t{}", photo.id, photo.image, photo.title);
    }
    Ok(())
}
