use anyhow::Context;
use clap::{Parser, Subcommand};

use bookshelf_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Book catalogue service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations and serve the HTTP API (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the HTTP routes exposed by the registered modules
    Routes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::debug!(env = ?settings.environment, command = ?cli.command, "bookshelf CLI");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => bookshelf_app::serve(settings).await,
        Command::Migrate => {
            let applied = bookshelf_app::migrate(&settings).await?;
            println!("applied {} migration(s)", applied);
            Ok(())
        }
        Command::Routes => {
            let registry = bookshelf_app::route_registry();
            for (method, path) in bookshelf_http::router::route_table(&registry) {
                println!("{:<7} {}", method, path);
            }
            Ok(())
        }
    }
}
