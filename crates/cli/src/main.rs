use anyhow::Context;
use bookshelf_app::{modules::catalog::repository, Application};
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about = "Manage the bookshelf catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the catalog over HTTP
    Serve {
        /// Drop, recreate, and seed every table before serving
        #[arg(long)]
        reset: bool,
    },
    /// Drop and recreate every table, then load the fixture catalog
    Reset,
    /// Print every author with their books
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve { reset } => {
            let reset = reset || settings.database.reset_on_startup;
            let app = Application::bootstrap(settings, reset).await?;
            app.serve().await
        }
        Command::Reset => {
            Application::bootstrap(settings, true).await?;
            tracing::info!("catalog reset to fixture data");
            println!("catalog reset");
            Ok(())
        }
        Command::List => {
            let app = Application::bootstrap(settings, false).await?;
            let listing = repository::list_all_authors(&app.db)
                .await
                .with_context(|| "failed to read catalog")?;

            for entry in listing {
                println!("{}\t{}", entry.author.id, entry.author.name);
                for book in entry.books {
                    println!("  {}\t{}", book.id, book.name);
                }
            }
            Ok(())
        }
    }
}
