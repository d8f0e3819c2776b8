use std::sync::Arc;

use {
    clap::Parser,
    secrecy::ExposeSecret,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    omniai_config::AppConfig,
    omniai_gateway::{AppState, serve},
    omniai_routing::AppContext,
};

#[derive(Parser)]
#[command(name = "omniai", about = "OmniAI — WhatsApp assistant webhook")]
struct Cli {
    /// Address to bind to (default 127.0.0.1).
    #[arg(long, env = "BIND")]
    bind: Option<String>,
    /// Port to listen on (default 8080).
    #[arg(long, env = "PORT")]
    port: Option<u16>,
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "omniai starting");

    let mut config = AppConfig::from_env();
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if config.openai.api_key.expose_secret().is_empty() {
        warn!("OPENAI_API_KEY is not set; model calls will fail");
    }
    if !config.whatsapp.has_send_credentials() {
        warn!("WHATSAPP_PHONE_ID/WHATSAPP_TOKEN are not set; replies will be skipped");
    }

    let ctx = AppContext::from_config(&config);
    let state = AppState {
        config: Arc::new(config),
        ctx: Arc::new(ctx),
    };
    serve(state).await
}
