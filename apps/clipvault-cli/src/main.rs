//! ClipVault command line entry point.

mod commands;
mod rpc;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use clipvault_uploader::{MediaBackend, MemoryBackend, UploaderConfig, config_path};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clipvault")]
#[command(about = "Upload and manage media in a ClipVault store")]
#[command(version)]
struct Cli {
    /// Gateway base URL (overrides the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a media file
    Upload {
        /// File to upload
        file: PathBuf,

        /// Owning user (defaults to the configured user)
        #[arg(long)]
        user: Option<String>,

        /// Caption; `#hashtags` become tags
        #[arg(long, default_value = "")]
        caption: String,

        /// Caller-supplied identifier stored with the record
        #[arg(long, default_value = "")]
        external_id: String,

        /// JSON file with capture metadata
        #[arg(long)]
        metadata: Option<PathBuf>,

        /// Run against an in-memory store instead of the gateway
        #[arg(long)]
        dry_run: bool,
    },
    /// List a user's videos
    Videos {
        #[arg(long)]
        user: Option<String>,
    },
    /// List a user's albums
    Albums {
        #[arg(long)]
        user: Option<String>,
    },
    /// Share a video with another user
    Share { video_id: String, target_user: String },
    /// Store default settings in the config file
    Config {
        #[arg(long)]
        user: Option<String>,

        /// Maximum bytes per chunk
        #[arg(long)]
        chunk_size: Option<u64>,

        /// Bearer token; pass an empty value to remove it
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let endpoint_flag = cli.endpoint;
    let mut config = UploaderConfig::load()?;
    if let Some(endpoint) = &endpoint_flag {
        config.endpoint = endpoint.clone();
    }
    tracing::debug!(endpoint = %config.endpoint, chunk_size = config.chunk_size, "configuration loaded");

    match cli.command {
        Command::Upload {
            file,
            user,
            caption,
            external_id,
            metadata,
            dry_run,
        } => {
            let backend: Arc<dyn MediaBackend> = if dry_run {
                Arc::new(MemoryBackend::new())
            } else {
                Arc::new(rpc::RpcBackend::new(&config)?)
            };
            let request = commands::UploadRequest {
                file,
                user: commands::resolve_user(user, &config)?,
                caption,
                external_id,
                metadata,
            };
            commands::upload(backend, &config, request).await.map(|_| ())
        }
        Command::Videos { user } => {
            let backend = rpc::RpcBackend::new(&config)?;
            let user = commands::resolve_user(user, &config)?;
            commands::list_videos(&backend, &user).await
        }
        Command::Albums { user } => {
            let backend = rpc::RpcBackend::new(&config)?;
            let user = commands::resolve_user(user, &config)?;
            commands::list_albums(&backend, &user).await
        }
        Command::Share {
            video_id,
            target_user,
        } => {
            let backend = rpc::RpcBackend::new(&config)?;
            commands::share(&backend, &video_id, &target_user).await
        }
        Command::Config {
            user,
            chunk_size,
            token,
        } => {
            // Environment overrides are not persisted.
            let mut stored = UploaderConfig::load_from(&config_path())?;
            if let Some(endpoint) = endpoint_flag {
                stored.endpoint = endpoint;
            }
            let stored = commands::apply_settings(stored, user, chunk_size, token)?;
            stored.save()?;
            println!("{}", config_path().display());
            Ok(())
        }
    }
}
