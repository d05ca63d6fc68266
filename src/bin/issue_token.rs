//! Mints a bearer token for a user id against the configured database.
//!
//! Usage: `issue-token <user-id> [ttl-seconds]`

use anyhow::Context;

use taskboard_backend::auth::jwt;
use taskboard_backend::config::Config;
use taskboard_backend::infrastructure::db;

const DEFAULT_TTL_SECS: usize = 15 * 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let user_id = args.next().context("usage: issue-token <user-id> [ttl-seconds]")?;
    let ttl_secs = match args.next() {
        Some(raw) => raw.parse().context("ttl-seconds must be a positive integer")?,
        None => DEFAULT_TTL_SECS,
    };

    let config = Config::from_env()?;
    let pool = db::init_db(&config.database_url).await?;

    let journal_mode = db::journal_mode(&pool).await?;
    eprintln!("Database: {} (journal mode {})", config.database_url, journal_mode);

    let key = jwt::get_or_create_signing_key(&pool).await?;
    let token = jwt::create_token(&key, &user_id, ttl_secs)?;

    println!("{}", token);
    Ok(())
}
