mod admin;
mod chat;
mod commands;
mod config;

use config::{AdminConfig, ClientConfig};

/// Used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "parlor=info,parlor_view=debug,parlor_types=warn,parlor_admin=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("admin") => admin::run(AdminConfig::from_env(), &args[1..]).await,
        _ => chat::run(ClientConfig::from_env()?).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_every_library() {
        let targets: Vec<&str> = DEFAULT_LOG_FILTER
            .split(',')
            .filter_map(|directive| directive.split('=').next())
            .collect();
        for target in ["parlor", "parlor_view", "parlor_types", "parlor_admin"] {
            assert!(targets.contains(&target), "missing {}", target);
        }
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
