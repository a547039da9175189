//! Check-db command - report the reviews table schema

use clap::Args;
use critic_core::Config;
use critic_db::Database;

/// Check that the reviews table exists and has the owner column
#[derive(Args, Debug)]
pub struct CheckDbArgs {
    /// Create the table or add missing columns instead of only reporting
    #[arg(long)]
    pub fix: bool,
}

impl CheckDbArgs {
    /// Execute the check-db command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let db = Database::open(&config.database.path, 1)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open database: {}", e))?;

        if self.fix {
            db.migrate().await?;
        }

        let status = db.verify_schema().await?;

        println!("Database: {}", config.database.path.display());
        println!("  reviews table: {}", present(status.table_exists));
        println!("  user_id column: {}", present(status.has_user_id));

        if status.is_ready() {
            println!();
            println!("Schema OK");
            return Ok(());
        }

        println!();
        status.ensure_ready()?;
        Ok(())
    }
}

fn present(ok: bool) -> &'static str {
    if ok {
        "present"
    } else {
        "MISSING"
    }
}
