use clap::Parser;
use lobcast::cli::{Cli, Commands};
use lobcast::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    lobcast::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Serve(args) => {
            tracing::info!("Starting distribution pipeline");
            args.execute(&config).await?;
        }
        Commands::Subscribe(args) => {
            tracing::info!("Starting subscriber");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Queue: {}", config.queue.url);
            println!(
                "  Poller: {} every {}ms ({} levels)",
                config.poller.symbol, config.poller.interval_ms, config.poller.depth_limit
            );
            println!(
                "  Broadcast: port {} draining every {}ms",
                config.broadcast.port, config.broadcast.drain_interval_ms
            );
            println!(
                "  Subscriber: {} ({} attempts, backoff {}..{}ms, history {})",
                config.subscriber.url,
                config.subscriber.max_reconnect_attempts,
                config.subscriber.reconnect_base_ms,
                config.subscriber.reconnect_cap_ms,
                config.subscriber.history_capacity
            );
        }
    }

    Ok(())
}
