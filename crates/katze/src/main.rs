//! Katze - browse cat images, cache them, and keep a list of favorites

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use katze::api::{CatApi, HttpCatApi};
use katze::config::GlobalArgs;
use katze::controller::CatsController;
use katze::feed::{CatsFeed, FavoritesFeed};
use katzecache::ImageCache;
use katzestore::{CatRecord, Favorites, KvStore};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List cats page by page, the way the cats screen scrolls
    Browse {
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: usize,

        /// Also download every image through the cache
        #[arg(long)]
        images: bool,
    },

    /// Manage the favorites list
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Load one image through the cache
    Image {
        /// Image URL
        url: String,

        /// Write the bytes to this file
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Load the image this many times
        #[arg(short, long, default_value_t = 1)]
        times: usize,
    },
}

#[derive(Subcommand, Debug)]
enum FavoritesAction {
    /// Print every favorite in insertion order
    List,
    /// Append a record
    Add(RecordArgs),
    /// Remove every entry equal to the favorite with this id
    Remove {
        /// Image id
        id: String,
    },
    /// Add the record, or remove it if its id is already a favorite
    Toggle(RecordArgs),
}

#[derive(Args, Debug)]
struct RecordArgs {
    /// Image id
    #[arg(long)]
    id: String,

    /// Image URL
    #[arg(long)]
    url: String,

    /// Width in pixels
    #[arg(long)]
    width: i64,

    /// Height in pixels
    #[arg(long)]
    height: i64,
}

impl From<RecordArgs> for CatRecord {
    fn from(args: RecordArgs) -> Self {
        CatRecord::new(args.id, args.url, args.width, args.height)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let settings = cli.global.resolve()?;

    info!("Starting Katze v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {}", settings.data_dir.display());
    info!("API: {}", settings.api.base_url);

    let store = Arc::new(
        KvStore::open(&settings.data_dir)
            .with_context(|| format!("Failed to open store in {}", settings.data_dir.display()))?,
    );
    let favorites = Favorites::open(Arc::clone(&store));
    info!("Loaded {} favorites", favorites.len());

    let api = Arc::new(HttpCatApi::new(&settings.api)?);
    let cats = CatsController::new(api, ImageCache::new(settings.cache), favorites, settings.limit);

    match cli.command {
        Command::Browse { pages, images } => browse(&cats, pages, images).await?,
        Command::Favorites { action } => favorites_command(&cats, action)?,
        Command::Image { url, out, times } => image(&cats, &url, out, times).await?,
    }

    store.close().context("Failed to close store")?;
    Ok(())
}

async fn browse<A: CatApi>(cats: &CatsController<A>, pages: usize, images: bool) -> Result<()> {
    let mut feed = CatsFeed::new();
    let mut loaded = 0;

    if pages > 0 {
        feed.extend(cats.fetch_cats().await);
        loaded += 1;
    }
    if feed.is_empty() {
        println!("No cats.");
        return Ok(());
    }

    let mut index = 0;
    while let Some(cell) = feed.cell(index, cats.favorites()) {
        let record = &cell.record;
        let size = if images {
            match cats.fetch_image(&record.image_url).await {
                Some(bytes) => format!(" [{} bytes]", bytes.len()),
                None => " [no image]".to_string(),
            }
        } else {
            String::new()
        };
        println!(
            "{:>4} {} {:<12} {:>5}x{:<5} {}{}",
            index,
            cell.heart(),
            record.id,
            record.width,
            record.height,
            record.image_url,
            size
        );

        if feed.needs_next_page(index) && loaded < pages {
            feed.extend(cats.fetch_cats().await);
            loaded += 1;
        }
        index += 1;
    }

    if images {
        println!("cache: {}", cats.images().cache().stats().snapshot());
    }
    Ok(())
}

fn favorites_command<A: CatApi>(cats: &CatsController<A>, action: FavoritesAction) -> Result<()> {
    match action {
        FavoritesAction::List => {
            let feed = FavoritesFeed::new(cats.favorites());
            if feed.shows_placeholder() {
                println!("No favorites yet.");
            }
            for (index, record) in feed.items().iter().enumerate() {
                println!(
                    "{:>4} ♥ {:<12} {:>5}x{:<5} {}",
                    index, record.id, record.width, record.height, record.image_url
                );
            }
        }
        FavoritesAction::Add(args) => {
            let record = CatRecord::from(args);
            let id = record.id.clone();
            cats.add_favorite(record)?;
            println!("Added {} ({} favorites)", id, cats.favorites().len());
        }
        FavoritesAction::Remove { id } => match cats.favorites().find(&id) {
            Some(record) => {
                let removed = cats.remove_favorite(&record)?;
                let noun = if removed == 1 { "entry" } else { "entries" };
                println!("Removed {} {} for {}", removed, noun, id);
            }
            None => println!("{} is not a favorite", id),
        },
        FavoritesAction::Toggle(args) => {
            let record = CatRecord::from(args);
            let id = record.id.clone();
            let now = cats.toggle_favorite(record)?;
            println!("{} {}", if now { '♥' } else { '♡' }, id);
        }
    }
    Ok(())
}

async fn image<A: CatApi>(
    cats: &CatsController<A>,
    url: &str,
    out: Option<PathBuf>,
    times: usize,
) -> Result<()> {
    let mut last = None;
    for _ in 0..times.max(1) {
        last = Some(cats.images().load(url).await?);
    }

    let stats = cats.images().cache().stats().snapshot();
    if let Some(bytes) = last {
        println!("{} bytes ({})", bytes.len(), stats);
        if let Some(path) = out {
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
