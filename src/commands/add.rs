use anyhow::{Context, Result};
use clap::Args;
use dialoguer::{Input, Password, theme::ColorfulTheme};
use tracing::info;

use crate::{
    constants::{OKTA_CREDS_KEY, OKTA_SESSION_COOKIE_KEY},
    okta::OktaCreds,
    store::{Item, KeyringStore, SecretStore},
};

#[derive(Debug, Clone, Args)]
pub struct AddCommand {}

impl AddCommand {
    pub async fn execute(self) -> Result<()> {
        let creds = prompt_for_credentials()?;

        println!("\nVerifying credentials with Okta...");
        creds
            .validate()
            .await
            .context("Okta rejected the supplied credentials")?;

        let store = KeyringStore::new();
        let data = serde_json::to_vec(&creds).context("Failed to encode Okta credentials")?;
        store
            .set(Item::new(OKTA_CREDS_KEY, data, "okta credentials"))
            .context("Failed to write Okta credentials to the secret store")?;

        // A session cookie minted for a previous identity must not survive
        // re-registration
        store
            .set(Item::new(
                OKTA_SESSION_COOKIE_KEY,
                Vec::new(),
                "okta session cookie",
            ))
            .context("Failed to reset the cached Okta session")?;

        info!("Stored Okta credentials for {}", creds.username);
        println!("Okta credentials for {} saved.", creds.username);

        Ok(())
    }
}

fn prompt_for_credentials() -> Result<OktaCreds> {
    println!("Registering Okta credentials in the OS secret store.");
    println!();

    let theme = ColorfulTheme::default();

    let organization = Input::<String>::with_theme(&theme)
        .with_prompt("Okta organization (the <org> in https://<org>.okta.com)")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("Okta organization cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let username = Input::<String>::with_theme(&theme)
        .with_prompt("Okta username")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("Okta username cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let password = Password::with_theme(&theme)
        .with_prompt("Okta password")
        .interact()?;

    Ok(OktaCreds {
        organization: organization.trim().to_string(),
        username: username.trim().to_string(),
        password,
    })
}
