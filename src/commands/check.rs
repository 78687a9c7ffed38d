use anyhow::{Context, Result};
use clap::Args;

use crate::{provider, store::KeyringStore};

#[derive(Debug, Clone, Args)]
pub struct CheckCommand {}

impl CheckCommand {
    pub async fn execute(self) -> Result<()> {
        let creds = provider::load_okta_creds(&KeyringStore::new())?;

        println!("Checking Okta credentials for {}...", creds.username);
        creds
            .validate()
            .await
            .context("Okta rejected the stored credentials")?;

        println!("Okta credentials for {} are valid.", creds.username);
        Ok(())
    }
}
