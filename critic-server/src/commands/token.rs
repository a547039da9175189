//! Token command - mint a bearer token for a user

use clap::Args;
use critic_core::{Config, Secrets};
use critic_server::TokenAuthority;

/// Mint a bearer token signed with the configured secret
#[derive(Args, Debug)]
pub struct TokenArgs {
    /// User ID written into the token subject
    #[arg(short, long)]
    pub user: String,

    /// Token lifetime, e.g. "30m" or "7d" (defaults to auth.token_ttl)
    #[arg(long)]
    pub ttl: Option<humantime::Duration>,
}

impl TokenArgs {
    /// Execute the token command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let user = self.user.trim();
        if user.is_empty() {
            anyhow::bail!("User ID must not be empty");
        }

        let secret = Secrets::load()?.jwt_secret().ok_or_else(|| {
            anyhow::anyhow!(
                "Token signing secret not found. Set CRITIC_JWT_SECRET or run `critic config --init-secrets`"
            )
        })?;

        let ttl = self.ttl.map(Into::into).unwrap_or(config.auth.token_ttl);
        let token = TokenAuthority::new(&secret, config.auth.issuer.clone()).issue(user, ttl)?;

        tracing::debug!(user, ttl = %humantime::format_duration(ttl), "Minted token");
        println!("{}", token);
        Ok(())
    }
}
