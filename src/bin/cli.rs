use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use sim_backend::db;
use sim_backend::session::JwtConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "sim admin tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database schema if it does not exist
    InitDb,
    /// Mint a session token for a user with the given roles/permissions
    MintToken {
        /// User id; a fresh one is generated when omitted
        #[arg(long)]
        user_id: Option<Uuid>,
        /// Role names, repeatable (e.g. --role ADMINISTRADOR)
        #[arg(long = "role")]
        roles: Vec<String>,
        /// Permission names, repeatable (e.g. --permission documents:read)
        #[arg(long = "permission")]
        permissions: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Try to load env from CWD; when running in a container the binary CWD
    // may differ, so fall back to the crate-local `.env`.
    if dotenv().is_err() {
        let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = get_pool().await?;
            db::init_schema(&pool).await?;
            println!("Schema initialized");
        }
        Commands::MintToken {
            user_id,
            roles,
            permissions,
        } => {
            let jwt = JwtConfig::from_env().context("JWT configuration missing")?;
            let user_id = user_id.unwrap_or_else(Uuid::new_v4);
            let token = jwt.encode(user_id, roles, permissions)?;
            println!("user_id: {user_id}");
            println!("{token}");
        }
    }

    Ok(())
}

async fn get_pool() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("failed to connect to database")?;
    Ok(pool)
}
