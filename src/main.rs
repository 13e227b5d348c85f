use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use tagmark::config::Config;
use tagmark::{build_app, cli, db, lookup_source};

#[derive(Parser)]
#[command(name = "tagmark", version, about = "Personal bookmarking service with automatic tagging")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create a user account
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        admin: bool,
    },
    /// Import bookmarks from a JSON export
    Import {
        #[arg(long)]
        file: String,
        #[arg(long)]
        username: String,
        /// Suggest tags for entries that have none
        #[arg(long)]
        auto_tag: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tagmark=info,tower_http=info")),
        )
        .init();

    let args = Cli::parse();
    let config = Config::from_env()?;
    let pool = db::init_pool(&config.database_url)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app = build_app(pool, &config, lookup_source(&config.lookup));
            let listener = TcpListener::bind(config.bind_addr)
                .await
                .with_context(|| format!("binding {}", config.bind_addr))?;

            tracing::info!("listening on {}", config.bind_addr);
            axum::serve(listener, app).await?;
        }
        Command::CreateUser {
            username,
            email,
            password,
            admin,
        } => {
            cli::create_user(&pool, &username, &email, &password, admin, config.auth.bcrypt_cost)
                .await?;
        }
        Command::Import {
            file,
            username,
            auto_tag,
        } => {
            let tagger = auto_tag.then(|| lookup_source(&config.lookup));
            let imported =
                cli::import_bookmarks(&pool, &file, &username, tagger.as_deref()).await?;
            println!("Imported {imported} bookmarks");
        }
    }

    Ok(())
}
