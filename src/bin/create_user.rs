//! Bootstrap a user account directly against the configured database.
//!
//! Every API route that creates users requires a token, so the first
//! account has to come from here.

use anyhow::{Context, Result};
use clap::Parser;
use timetable::{
    config::ConfigLoader,
    db,
    password::PasswordHasher,
    repositories::{NewUser, UserRepository},
    telemetry,
};

#[derive(Debug, Parser)]
#[command(name = "create_user", about = "Create a timetable user account")]
struct Args {
    /// Family name
    #[arg(long)]
    last_name: String,

    /// Given name
    #[arg(long)]
    first_name: String,

    #[arg(long)]
    email: String,

    /// Plain password; stored hashed
    #[arg(long)]
    password: String,

    /// `admin` or `enseignant`
    #[arg(long, default_value = "admin")]
    role: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    telemetry::init_tracing(&config).context("initializing tracing")?;

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    if config.run_migrations {
        db::run_migrations(&db).await?;
    }

    let hasher = PasswordHasher::new(config.password_hash_iterations);
    let user = UserRepository::new(&db)
        .create_user(
            &hasher,
            NewUser {
                last_name: args.last_name,
                first_name: args.first_name,
                email: args.email,
                password: args.password,
                role: Some(args.role),
            },
        )
        .await
        .context("creating user")?;

    println!("Created user {} <{}> with role {}", user.id, user.email, user.role);
    Ok(())
}
