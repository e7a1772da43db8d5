use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use filedesk::{
    format_bytes, format_date_time, ApiClient, Config, DirectorySink, FileStore, UploadPayload,
};

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "FILEDESK_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "filedesk.toml";

#[derive(Parser)]
#[command(
    name = "filedesk",
    version,
    about = "Manage files on a REST file service",
    after_help = "Config is read from $FILEDESK_CONFIG or ./filedesk.toml; \
                  FILEDESK_API_BASE_URL and FILEDESK_API_TOKEN override it."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List files, most recent first.
    List,
    /// Upload a local file.
    Upload {
        /// Path to the file to upload.
        path: PathBuf,
        /// Optional description stored with the file.
        description: Option<String>,
    },
    /// Delete a file.
    Delete {
        /// File ID.
        id: i64,
    },
    /// Download a file into the download directory.
    Download {
        /// File ID.
        id: i64,
    },
}

fn load_config() -> filedesk::Result<Config> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = match Config::load(&path) {
        Ok(config) => config,
        Err(filedesk::FiledeskError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            Config::default()
        }
        Err(e) => return Err(e),
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

async fn print_error_state(store: &FileStore<ApiClient>) -> ExitCode {
    if let Some(message) = store.error().await {
        eprintln!("error: {message}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Print the store's notification, if one is showing.
async fn print_toast(store: &FileStore<ApiClient>) {
    let toast = store.toast().await;
    if toast.is_visible() {
        if let Some(message) = toast.message {
            println!("{}: {message}", toast.variant);
        }
    }
}

async fn run(command: Command, store: FileStore<ApiClient>, timezone: &str) -> ExitCode {
    match command {
        Command::List => {
            store.fetch_files().await;
            if store.error().await.is_some() {
                return print_error_state(&store).await;
            }

            let files = store.files().await;
            if files.is_empty() {
                println!("no files");
            }
            for file in files {
                println!(
                    "{:>6}  {:<40}  {:>8}  {}",
                    file.id,
                    file.original_name,
                    format_bytes(file.size),
                    format_date_time(file.created_at.as_deref(), timezone),
                );
            }
            ExitCode::SUCCESS
        }
        Command::Upload { path, description } => {
            let mut payload = match UploadPayload::from_path(&path).await {
                Ok(payload) => payload,
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            };
            if let Some(description) = description {
                payload = payload.with_description(description);
            }

            match store.upload(&payload).await {
                Ok(record) => {
                    print_toast(&store).await;
                    println!("#{} {}", record.id, record.original_name);
                    ExitCode::SUCCESS
                }
                Err(_) => print_error_state(&store).await,
            }
        }
        Command::Delete { id } => {
            store.remove(id).await;
            if store.error().await.is_none() {
                print_toast(&store).await;
            }
            print_error_state(&store).await
        }
        Command::Download { id } => {
            store.fetch_files().await;
            if store.error().await.is_some() {
                return print_error_state(&store).await;
            }

            let Some(file) = store.raw_files().await.into_iter().find(|f| f.id == id) else {
                eprintln!("error: file #{id} not found");
                return ExitCode::FAILURE;
            };

            match store.download(&file).await {
                Some(path) => {
                    print_toast(&store).await;
                    println!("saved {}", path.display());
                    ExitCode::SUCCESS
                }
                None => print_error_state(&store).await,
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = filedesk::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        filedesk::logging::init_console_only(&config.logging.level);
    }

    let sink = DirectorySink::new(&config.download.directory);
    info!(directory = %sink.directory().display(), "saving downloads");

    let client = match ApiClient::new(&config.api, Arc::new(sink)) {
        Ok(client) => client,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    info!(base_url = %client.base_url(), "filedesk started");
    run(cli.command, FileStore::new(client), &config.display.timezone).await
}
