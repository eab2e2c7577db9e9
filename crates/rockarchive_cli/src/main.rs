//! Command-line surface for the band archive.
//!
//! # Responsibility
//! - Map user actions (browse, curate, ask) onto `rockarchive_core` calls.
//! - Render what the core returns; chat failures are printed, not raised.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::warn;
use rockarchive_core::context::or_unknown;
use rockarchive_core::{
    default_log_level, init_logging, load_config, migrate_records, open_record_store,
    ArchiveConfig, ArchiveService, ArtistId, ArtistRecord, AssetStore, BackendKind, ChatPipeline,
    GeminiService, ImageRef, ImageUpload, JsonDocumentStore, NewArtist, RecordStore,
    SqliteArtistStore, AI_ERROR_PREFIX, MISSING_API_KEY_WARNING,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "rockarchive", version, about = "Browse and question the Algerian rock archive")]
struct CliArgs {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured storage backend.
    #[arg(long, value_enum, global = true)]
    backend: Option<BackendArg>,

    /// Overrides the configured data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shows the collection.
    List,
    /// Shows one band profile.
    Show { id: i64 },
    /// Adds a band to the archive.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        genre: String,
        /// City of origin.
        #[arg(long, default_value = "")]
        origin: String,
        /// Active era.
        #[arg(long, default_value = "")]
        era: String,
        #[arg(long, default_value = "")]
        bio: String,
        /// Famous tracks, comma separated.
        #[arg(long, default_value = "")]
        tracks: String,
        /// Album cover to copy into the image folder.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Asks a question about the archive.
    Ask {
        question: String,
        /// Id of the band currently being viewed.
        #[arg(long)]
        focus: Option<i64>,
        #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true, default_value = "")]
        api_key: String,
    },
    /// Rebuilds the SQLite table from the JSON document.
    Migrate,
    /// Lists the generation models available to a key.
    Models {
        #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true, default_value = "")]
        api_key: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    Document,
    Relational,
}

impl From<BackendArg> for BackendKind {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Document => BackendKind::Document,
            BackendArg::Relational => BackendKind::Relational,
        }
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = resolve_config(&args)?;
    start_logging(&config);

    match args.command {
        Command::List => list(&archive_service(&config)?),
        Command::Show { id } => show(&archive_service(&config)?, ArtistId(id))?,
        Command::Add {
            name,
            genre,
            origin,
            era,
            bio,
            tracks,
            image,
        } => {
            let upload = image
                .map(ImageUpload::from_path)
                .transpose()
                .context("could not read the album cover")?;
            let input = NewArtist {
                name,
                genre,
                origin,
                era,
                bio,
                tracks,
            };
            let service = archive_service(&config)?;
            let id = service.add_artist(&input, upload.as_ref())?;
            println!("✅ {} added to the shelf! (id {id})", input.name.trim());
        }
        Command::Ask {
            question,
            focus,
            api_key,
        } => {
            let service = archive_service(&config)?;
            let pipeline = ChatPipeline::new(gemini(&config));
            println!(
                "{}",
                service.ask(&pipeline, &api_key, &question, focus.map(ArtistId))
            );
        }
        Command::Migrate => migrate(&config)?,
        Command::Models { api_key } => models(&config, &api_key),
    }

    Ok(())
}

fn resolve_config(args: &CliArgs) -> Result<ArchiveConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(backend) = args.backend {
        config.backend = backend.into();
    }
    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.clone();
    }
    Ok(config)
}

fn start_logging(config: &ArchiveConfig) {
    let level = config.log_level.as_deref().unwrap_or(default_log_level());
    let log_dir = match absolute(&config.log_dir()) {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("logging disabled: {err}");
            return;
        }
    };
    if let Err(err) = init_logging(level, &log_dir) {
        eprintln!("logging disabled: {err}");
    }
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn archive_service(config: &ArchiveConfig) -> Result<ArchiveService<Box<dyn RecordStore>>> {
    let store = open_record_store(config).context("could not open the record store")?;
    let assets = AssetStore::new(&config.images_dir);
    if let Err(err) = assets.ensure_root() {
        warn!("event=assets_init module=cli status=error error={err}");
    }
    Ok(ArchiveService::new(store, assets))
}

fn gemini(config: &ArchiveConfig) -> GeminiService {
    GeminiService::new(&config.generation.base_url, &config.generation.model)
}

fn list(service: &ArchiveService<Box<dyn RecordStore>>) {
    let artists = service.list_artists();
    if artists.is_empty() {
        println!("The collection is empty. Add a band with `rockarchive add --name ...`.");
        return;
    }

    println!("The Collection");
    for artist in &artists {
        println!(
            "  [{}] {} ({}) {}",
            artist.id.map(|id| id.to_string()).unwrap_or_default(),
            artist.name,
            or_unknown(&artist.genre),
            render_image(service.assets(), artist)
        );
    }
}

fn show(service: &ArchiveService<Box<dyn RecordStore>>, id: ArtistId) -> Result<()> {
    let Some(artist) = service.get_artist(id) else {
        bail!("no band with id {id}");
    };

    println!("{}", artist.name);
    println!("  image:  {}", render_image(service.assets(), &artist));
    println!("  origin: {}", or_unknown(&artist.origin));
    println!("  genre:  {}", or_unknown(&artist.genre));
    println!("  era:    {}", or_unknown(&artist.era));
    println!();
    println!("{}", artist.bio);
    println!();
    println!("Essential Tracks");
    for track in &artist.famous_tracks {
        println!("  🎵 {track}");
    }
    Ok(())
}

fn migrate(config: &ArchiveConfig) -> Result<()> {
    let document = JsonDocumentStore::new(config.document_path());
    if !document.path().exists() {
        println!("No JSON file found at {}. Skipping migration.", document.path().display());
        return Ok(());
    }

    let database_path = config.database_path();
    match std::fs::remove_file(&database_path) {
        Ok(()) => println!("Rebuilding {} from the JSON file.", database_path.display()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| {
                format!("could not remove {}", database_path.display())
            })
        }
    }

    let relational = SqliteArtistStore::open(&database_path)
        .context("could not open the relational store")?;
    let migrated = migrate_records(&document, &relational)?;
    println!(
        "Migrated {migrated} artists into {}.",
        database_path.display()
    );
    Ok(())
}

fn models(config: &ArchiveConfig, api_key: &str) {
    if api_key.is_empty() {
        println!("{MISSING_API_KEY_WARNING}");
        return;
    }

    match gemini(config).list_models(api_key) {
        Ok(models) if models.is_empty() => {
            println!("No text generation models found. Check the key's permissions.")
        }
        Ok(models) => {
            for model in models {
                println!("{model}");
            }
        }
        Err(err) => println!("{AI_ERROR_PREFIX}{err}"),
    }
}

fn render_image(assets: &AssetStore, artist: &ArtistRecord) -> String {
    match assets.resolve_image(artist.image.as_deref()) {
        ImageRef::File(path) => path.display().to_string(),
        ImageRef::Placeholder(url) => url.to_string(),
    }
}
