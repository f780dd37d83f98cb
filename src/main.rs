use anyhow::{bail, Context, Result};
use cdx::config::{Config, OutputFormat};
use cdx::models::{app, client, consent, dataset, grant, identity, job, UploadDatasetParams};
use cdx::resource::{collect_all, Filter, Page};
use cdx::resource::id::{AppId, ClientId, ConsentId, DatasetId, GrantId, IdentityId, JobId};
use cdx::CdxClient;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command-line client for the confidential data-exchange gateway
#[derive(Parser, Debug)]
#[command(name = "cdx", version, about, long_about = None)]
struct Args {
    /// Gateway base URL
    #[arg(long)]
    base_url: Option<String>,

    /// API token (defaults to CDX_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List resources of a kind
    List {
        kind: Kind,
        /// Parent id for nested kinds (app for clients and jobs, identity for consents)
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long)]
        page_token: Option<String>,
        /// Follow the cursor until the collection is exhausted
        #[arg(long)]
        all: bool,
    },
    /// Show one resource
    Get {
        kind: Kind,
        id: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Delete one resource
    Delete {
        kind: Kind,
        id: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Upload a file as a new dataset
    Upload {
        file: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// JSON object stored with the dataset
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Download a dataset's content
    Download {
        id: String,
        /// Destination file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Poll a job until it finishes
    WaitJob {
        app_id: String,
        job_id: String,
        /// Seconds between polls
        #[arg(long, default_value_t = 2)]
        interval: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Identity,
    App,
    Client,
    Consent,
    Grant,
    Dataset,
    Job,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("cdx {} started with log level: {:?}", env!("CARGO_PKG_VERSION"), level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("cdx").join("cdx.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".cdx").join("cdx.log");
    }
    PathBuf::from("cdx.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: {err:#}");
            None
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            match err.downcast_ref::<cdx::Error>() {
                Some(e) => eprintln!("Error: {}", e.user_message()),
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load();
    let output = args.output.unwrap_or(config.output);
    let cdx = CdxClient::from_config(&config, args.base_url.as_deref(), args.token.as_deref())?;

    match args.command {
        Command::List {
            kind,
            parent,
            page_size,
            page_token,
            all,
        } => {
            let target = Target::resolve(kind, parent.as_deref())?;
            let mut filter = Filter::new();
            if let Some(size) = page_size {
                filter = filter.page_size(size);
            }

            if all {
                let items = collect_all(|token| {
                    let mut filter = filter.clone();
                    if let Some(token) = &token {
                        filter = filter.next_page_token(token);
                    }
                    list_page(&cdx, &target, filter)
                })
                .await?;
                print(output, &items)
            } else {
                if let Some(token) = &page_token {
                    filter = filter.next_page_token(token);
                }
                let page = list_page(&cdx, &target, filter).await?;
                print(output, &page_output(page))
            }
        }
        Command::Get { kind, id, parent } => {
            let target = Target::resolve(kind, parent.as_deref())?;
            let data = get_one(&cdx, &target, &id).await?;
            print(output, &data)
        }
        Command::Delete { kind, id, parent } => {
            let target = Target::resolve(kind, parent.as_deref())?;
            delete_one(&cdx, &target, &id).await?;
            eprintln!("Deleted {:?} {}", kind, id);
            Ok(())
        }
        Command::Upload {
            file,
            name,
            description,
            tags,
            metadata,
        } => {
            let metadata = metadata
                .map(|raw| serde_json::from_str::<Map<String, Value>>(&raw))
                .transpose()
                .context("--metadata must be a JSON object")?;
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let params = UploadDatasetParams {
                name: name.or_else(|| file.file_name().map(|n| n.to_string_lossy().into_owned())),
                description,
                tags,
                metadata,
            };
            let dataset = cdx.upload_dataset(bytes, Some(params)).await?;
            print(output, dataset.data())
        }
        Command::Download { id, out } => {
            let download = cdx.download_dataset(&DatasetId::new(id))?;
            let written = match out {
                Some(path) => {
                    let mut file = tokio::fs::File::create(&path)
                        .await
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    download.pipe_to(&mut file).await?
                }
                None => download.pipe_to(&mut tokio::io::stdout()).await?,
            };
            tracing::info!("wrote {} bytes", written);
            Ok(())
        }
        Command::WaitJob {
            app_id,
            job_id,
            interval,
        } => {
            let app_id = AppId::new(app_id);
            let mut job = cdx.jobs(&app_id).get(&JobId::new(job_id)).await?;
            let mut last_status = job.status();
            eprintln!("{}: {}", job.id(), last_status);

            while !job.is_finished() {
                tokio::time::sleep(Duration::from_secs(interval.max(1))).await;
                job.refresh().await?;
                if job.status() != last_status {
                    last_status = job.status();
                    eprintln!("{}: {}", job.id(), last_status);
                }
            }
            print(output, job.data())
        }
    }
}

/// A kind resolved against its parent, if it has one
#[derive(Debug, Clone)]
enum Target {
    Identity,
    App,
    Grant,
    Dataset,
    Client(AppId),
    Job(AppId),
    Consent(IdentityId),
}

impl Target {
    fn resolve(kind: Kind, parent: Option<&str>) -> Result<Self> {
        let target = match (kind, parent) {
            (Kind::Identity, _) => Self::Identity,
            (Kind::App, _) => Self::App,
            (Kind::Grant, _) => Self::Grant,
            (Kind::Dataset, _) => Self::Dataset,
            (Kind::Client, Some(p)) => Self::Client(AppId::new(p)),
            (Kind::Job, Some(p)) => Self::Job(AppId::new(p)),
            (Kind::Consent, Some(p)) => Self::Consent(IdentityId::new(p)),
            (Kind::Client | Kind::Job | Kind::Consent, None) => {
                bail!("{:?} is a nested resource; pass --parent", kind)
            }
        };
        Ok(target)
    }
}

fn json_page<R, D: Serialize>(page: Page<R>, data: impl Fn(R) -> D) -> cdx::Result<Page<Value>> {
    let (results, next_page_token) = page.into_parts();
    let results = results
        .into_iter()
        .map(|r| serde_json::to_value(data(r)).map_err(cdx::Error::Encode))
        .collect::<cdx::Result<Vec<_>>>()?;
    Ok(Page {
        results,
        next_page_token,
    })
}

async fn list_page(cdx: &CdxClient, target: &Target, filter: Filter) -> cdx::Result<Page<Value>> {
    let http = cdx.http();
    match target {
        Target::Identity => json_page(identity::list(http, filter).await?, |r| r.into_data()),
        Target::App => json_page(app::list(http, filter).await?, |r| r.into_data()),
        Target::Grant => json_page(grant::list(http, filter).await?, |r| r.into_data()),
        Target::Dataset => json_page(dataset::list(http, filter).await?, |r| r.into_data()),
        Target::Client(app_id) => json_page(client::list(http, app_id, filter).await?, |r| r.into_data()),
        Target::Job(app_id) => json_page(job::list(http, app_id, filter).await?, |r| r.into_data()),
        Target::Consent(identity_id) => {
            json_page(consent::list(http, identity_id, filter).await?, |r| r.into_data())
        }
    }
}

async fn get_one(cdx: &CdxClient, target: &Target, id: &str) -> Result<Value> {
    let http = cdx.http();
    let value = match target {
        Target::Identity => to_json(identity::get(http, &IdentityId::new(id)).await?.data())?,
        Target::App => to_json(app::get(http, &AppId::new(id)).await?.data())?,
        Target::Grant => to_json(grant::get(http, &GrantId::new(id)).await?.data())?,
        Target::Dataset => to_json(dataset::get(http, &DatasetId::new(id)).await?.data())?,
        Target::Client(app_id) => to_json(client::get(http, &ClientId::new(id), app_id).await?.data())?,
        Target::Job(app_id) => to_json(job::get(http, &JobId::new(id), app_id).await?.data())?,
        Target::Consent(identity_id) => {
            to_json(consent::get(http, &ConsentId::new(id), identity_id).await?.data())?
        }
    };
    Ok(value)
}

async fn delete_one(cdx: &CdxClient, target: &Target, id: &str) -> Result<()> {
    let http = cdx.http();
    match target {
        Target::Identity => identity::delete(http, &IdentityId::new(id)).await?,
        Target::App => app::delete(http, &AppId::new(id)).await?,
        Target::Grant => grant::delete(http, &GrantId::new(id)).await?,
        Target::Dataset => dataset::delete(http, &DatasetId::new(id)).await?,
        Target::Client(app_id) => client::delete(http, &ClientId::new(id), app_id).await?,
        Target::Job(app_id) => job::delete(http, &JobId::new(id), app_id).await?,
        Target::Consent(identity_id) => consent::delete(http, &ConsentId::new(id), identity_id).await?,
    }
    Ok(())
}

fn to_json<T: Serialize>(data: &T) -> Result<Value> {
    serde_json::to_value(data).context("Failed to render resource")
}

fn page_output(page: Page<Value>) -> Value {
    let (results, next_page_token) = page.into_parts();
    let mut out = Map::new();
    out.insert("results".to_string(), Value::Array(results));
    if let Some(token) = next_page_token {
        out.insert("nextPageToken".to_string(), Value::String(token));
    }
    Value::Object(out)
}

fn print<T: Serialize + ?Sized>(format: OutputFormat, value: &T) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
