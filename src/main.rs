use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use propex::config::{self, DatabaseSettings, DEFAULT_HOST, DEFAULT_PORT};
use propex::models::AppState;
use propex::routes::build_router;
use propex::services::CredentialStore;
use propex::store::{PostgresStore, RecordStore};

fn build_state_from_env(env_file: Option<&str>) -> AppState {
    config::load_env_file(env_file);
    let settings = match DatabaseSettings::from_env() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(%e, "Invalid warehouse configuration");
            eprintln!("{}: {}", yansi::Paint::red("Configuration error"), e);
            process::exit(1);
        }
    };
    let store: Option<Arc<dyn RecordStore>> = match PostgresStore::from_settings(&settings) {
        Some(s) => Some(Arc::new(s)),
        None => {
            tracing::warn!("SYNAPSE_PASSWORD is not set; using seed data and disabling save");
            None
        }
    };
    tracing::info!(?settings, "Resolved warehouse settings");
    AppState::new(CredentialStore::demo(), settings, store)
}

async fn start_server(state: AppState, host: &str, port: u16) {
    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(%e, "Invalid host/port format");
            eprintln!("{}: {}", yansi::Paint::red("Invalid host/port format"), e);
            process::exit(1);
        }
    };
    let app = build_router(state);
    tracing::info!(%addr, "Starting property export server");
    println!("{} {}", yansi::Paint::new("Web server running on").green(), yansi::Paint::new(format!("http://{}", addr)).cyan());
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(%e, "Server encountered an error while running");
                eprintln!("{}: {}", yansi::Paint::new("Server error").red(), e);
                process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(%e, "Failed to bind to address; is the port already in use?");
            eprintln!("{}: {}\n{}", yansi::Paint::new(format!("Failed to bind to {}", addr)).red(), e, yansi::Paint::new("Please stop any process using this port, or start the server with a different --port value.").yellow());
            process::exit(1);
        }
    }
}

async fn check_config(env_file: Option<&str>) {
    let state = build_state_from_env(env_file);
    println!("{:#?}", state.settings);
    let Some(store) = state.store.as_deref() else {
        eprintln!("{}", yansi::Paint::new("SYNAPSE_PASSWORD is not configured").red());
        process::exit(1);
    };
    match store.load_all().await {
        Ok(Some(rows)) => println!(
            "{} {} ({} rows)",
            yansi::Paint::new("Connected; table found:").green(),
            state.table_label(),
            rows.len()
        ),
        Ok(None) => println!(
            "{} {} {}",
            yansi::Paint::new("Connected; table").yellow(),
            state.table_label(),
            yansi::Paint::new("does not exist yet and will be created on first save").yellow()
        ),
        Err(e) => {
            eprintln!("{}: {}", yansi::Paint::new("Failed to connect to database").red(), e);
            process::exit(1);
        }
    }
}

#[derive(Parser)]
#[command(
    name = "propex",
    author,
    version,
    about = "Property management data export tool",
    long_about = r#"Serve a small web form for viewing, editing, exporting and saving monthly property records.

Warehouse settings come from SYNAPSE_* environment variables (optionally from a .env file).
Without SYNAPSE_PASSWORD the tool runs on seed data and saving is disabled.

Examples:
  1) Run the server (dev):
      cargo run -- serve --host 127.0.0.1 --port 8080
  2) Validate warehouse settings:
      propex check-config --env-file .env
"#,
    after_help = "Use `propex <subcommand> --help` to get subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        #[arg(long, default_value_t = String::from(DEFAULT_HOST))]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Path to a .env file to load instead of ./.env
        #[arg(long)]
        env_file: Option<String>,
    },
    #[command(about = "Validate warehouse configuration and connectivity", long_about = "Print the resolved SYNAPSE_* settings (password masked), then connect and report whether the export table exists and how many rows it holds.")]
    CheckConfig {
        #[arg(long)]
        env_file: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    match cli.command {
        None => {
            let state = build_state_from_env(None);
            start_server(state, DEFAULT_HOST, DEFAULT_PORT).await;
        }
        Some(Commands::Serve {
            host,
            port,
            env_file,
        }) => {
            let state = build_state_from_env(env_file.as_deref());
            start_server(state, &host, port).await;
        }
        Some(Commands::CheckConfig { env_file }) => {
            check_config(env_file.as_deref()).await;
        }
    }
}
