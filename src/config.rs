use crate::constants::{
    self, DEFAULT_SESSION_DURATION_HOURS, MAX_SESSION_DURATION_HOURS, MIN_SESSION_DURATION_HOURS,
};
use anyhow::{Context, Result};
use dialoguer::{Input, theme::ColorfulTheme};
use ini::{Ini, Properties};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

#[derive(Debug, Clone)]
pub struct Config {
    /// IAM role ARN assumed via federation
    pub role_arn: String,
    /// Okta AWS application embed URL (SAML flow)
    pub okta_saml_url: String,
    /// Okta OIDC application id; empty selects the SAML flow
    pub okta_oidc_app_id: String,
    pub default_session_duration_hours: u8,
}

impl Config {
    fn from_ini_section(section: &Properties) -> Self {
        Self {
            role_arn: section.get("role_arn").unwrap_or("").to_string(),
            okta_saml_url: section.get("okta_saml_url").unwrap_or("").to_string(),
            okta_oidc_app_id: section.get("okta_oidc_app_id").unwrap_or("").to_string(),
            default_session_duration_hours: section
                .get("default_session_duration_hours")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SESSION_DURATION_HOURS),
        }
    }

    /// Resolve the session duration, preferring an explicit override in
    /// hours over the configured default
    pub fn session_duration(&self, override_hours: Option<u8>) -> Result<Duration> {
        let hours = override_hours.unwrap_or(self.default_session_duration_hours);

        if !(MIN_SESSION_DURATION_HOURS..=MAX_SESSION_DURATION_HOURS).contains(&hours) {
            anyhow::bail!(
                "Session duration must be between {MIN_SESSION_DURATION_HOURS} and {MAX_SESSION_DURATION_HOURS} hours, got {hours}"
            );
        }

        Ok(Duration::from_secs(u64::from(hours) * 3600))
    }

    fn save_to_ini(&self, ini: &mut Ini, profile: &str) {
        let section_name = if profile == "default" {
            profile.to_string()
        } else {
            format!("profile {profile}")
        };

        ini.with_section(Some(section_name))
            .set("role_arn", &self.role_arn)
            .set("okta_saml_url", &self.okta_saml_url)
            .set("okta_oidc_app_id", &self.okta_oidc_app_id)
            .set(
                "default_session_duration_hours",
                self.default_session_duration_hours.to_string(),
            );
    }
}

pub async fn load(profile: &str) -> Result<Config> {
    let path = get_config_path()?;
    let ini = Ini::load_from_file(&path)
        .context("Failed to load config file. Please run `okaws configure` first")?;

    let section_name = if profile == "default" {
        profile.to_string()
    } else {
        format!("profile {profile}")
    };

    let section = ini
        .section(Some(&section_name))
        .with_context(|| format!("Profile '{profile}' not found in config"))?;

    Ok(Config::from_ini_section(section))
}

pub async fn save(profile: &str, config: &Config) -> Result<()> {
    let path = get_config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut ini = if path.exists() {
        Ini::load_from_file(&path).unwrap_or_else(|_| Ini::new())
    } else {
        Ini::new()
    };

    config.save_to_ini(&mut ini, profile);

    ini.write_to_file(&path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

pub async fn configure_interactive(profile: &str) -> Result<()> {
    println!("Configuring okaws for profile: {profile}");

    let existing_config = load(profile).await.ok();

    if existing_config.is_some() {
        println!("Press Enter to keep current values, or type new values.");
    }
    println!();

    let theme = ColorfulTheme::default();

    let default_config = existing_config.unwrap_or(Config {
        role_arn: String::new(),
        okta_saml_url: String::new(),
        okta_oidc_app_id: String::new(),
        default_session_duration_hours: DEFAULT_SESSION_DURATION_HOURS,
    });

    let role_arn = Input::<String>::with_theme(&theme)
        .with_prompt("IAM Role ARN")
        .default(default_config.role_arn.clone())
        .allow_empty(!default_config.role_arn.is_empty())
        .validate_with(|input: &String| {
            if input.is_empty() {
                Err("IAM Role ARN is required")
            } else if !is_valid_role_arn(input) {
                Err("IAM Role ARN must look like arn:aws:iam::123456789012:role/RoleName")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .context("Failed to read IAM Role ARN")?;

    let okta_saml_url = Input::<String>::with_theme(&theme)
        .with_prompt("Okta AWS application URL (leave empty for OIDC)")
        .default(default_config.okta_saml_url)
        .allow_empty(true)
        .interact_text()
        .context("Failed to read Okta application URL")?;

    let okta_oidc_app_id = Input::<String>::with_theme(&theme)
        .with_prompt("Okta OIDC application id (leave empty for SAML)")
        .default(default_config.okta_oidc_app_id)
        .allow_empty(true)
        .interact_text()
        .context("Failed to read Okta OIDC application id")?;

    if okta_saml_url.is_empty() && okta_oidc_app_id.is_empty() {
        anyhow::bail!("Either the Okta application URL or an OIDC application id is required");
    }

    let default_session_duration_hours = Input::<u8>::with_theme(&theme)
        .with_prompt("Default Session Duration Hours (1-12)")
        .default(default_config.default_session_duration_hours)
        .validate_with(|input: &u8| {
            if *input >= MIN_SESSION_DURATION_HOURS && *input <= MAX_SESSION_DURATION_HOURS {
                Ok(())
            } else {
                Err("Please enter a value between 1 and 12")
            }
        })
        .interact_text()
        .context("Failed to read session duration")?;

    let config = Config {
        role_arn,
        okta_saml_url,
        okta_oidc_app_id,
        default_session_duration_hours,
    };

    save(profile, &config).await?;

    println!("\nConfiguration saved successfully.");
    Ok(())
}

fn get_config_path() -> Result<PathBuf> {
    constants::get_aws_config_path().context("Failed to determine AWS config path")
}

fn is_valid_role_arn(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();

    parts.len() == 6
        && parts[0] == "arn"
        && !parts[1].is_empty()
        && parts[2] == "iam"
        && parts[3].is_empty()
        && parts[4].len() == 12
        && parts[4].chars().all(|c| c.is_ascii_digit())
        && parts[5].starts_with("role/")
        && parts[5].len() > "role/".len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_role_arn() {
        assert!(is_valid_role_arn("arn:aws:iam::123456789012:role/Dev"));
        assert!(is_valid_role_arn(
            "arn:aws-us-gov:iam::123456789012:role/Admin"
        ));
        assert!(is_valid_role_arn(
            "arn:aws:iam::111111111111:role/path/NestedRole"
        ));
    }

    #[test]
    fn test_invalid_role_arn() {
        assert!(!is_valid_role_arn(""));
        assert!(!is_valid_role_arn("not-an-arn"));
        assert!(!is_valid_role_arn("arn:aws:iam::123456789012:role/"));
        assert!(!is_valid_role_arn("arn:aws:iam::12345:role/Dev"));
        assert!(!is_valid_role_arn("arn:aws:iam::12345678901a:role/Dev"));
        assert!(!is_valid_role_arn("arn:aws:s3:::my-bucket"));
        assert!(!is_valid_role_arn(
            "arn:aws:iam::123456789012:saml-provider/Okta"
        ));
    }

    #[test]
    fn test_config_from_ini_section() {
        let mut props = Properties::new();
        props.insert(
            "role_arn".to_string(),
            "arn:aws:iam::123456789012:role/Dev".to_string(),
        );
        props.insert(
            "okta_saml_url".to_string(),
            "https://acme.okta.com/home/amazon_aws/0oa1/272".to_string(),
        );
        props.insert("okta_oidc_app_id".to_string(), "0oa1bcdEFGh".to_string());
        props.insert(
            "default_session_duration_hours".to_string(),
            "4".to_string(),
        );

        let config = Config::from_ini_section(&props);

        assert_eq!(config.role_arn, "arn:aws:iam::123456789012:role/Dev");
        assert_eq!(
            config.okta_saml_url,
            "https://acme.okta.com/home/amazon_aws/0oa1/272"
        );
        assert_eq!(config.okta_oidc_app_id, "0oa1bcdEFGh");
        assert_eq!(config.default_session_duration_hours, 4);
    }

    #[test]
    fn test_config_from_ini_section_with_defaults() {
        let props = Properties::new();
        let config = Config::from_ini_section(&props);

        assert_eq!(config.role_arn, "");
        assert_eq!(config.okta_saml_url, "");
        assert_eq!(config.okta_oidc_app_id, "");
        assert_eq!(
            config.default_session_duration_hours,
            DEFAULT_SESSION_DURATION_HOURS
        );
    }

    #[test]
    fn test_config_from_ini_section_ignores_bad_duration() {
        let mut props = Properties::new();
        props.insert(
            "default_session_duration_hours".to_string(),
            "soon".to_string(),
        );

        let config = Config::from_ini_section(&props);
        assert_eq!(
            config.default_session_duration_hours,
            DEFAULT_SESSION_DURATION_HOURS
        );
    }

    fn config_with_default_hours(hours: u8) -> Config {
        Config {
            role_arn: "arn:aws:iam::123456789012:role/Developer".to_string(),
            okta_saml_url: "https://acme.okta.com/app/amazon_aws/abc/sso/saml".to_string(),
            okta_oidc_app_id: String::new(),
            default_session_duration_hours: hours,
        }
    }

    #[test]
    fn test_session_duration_uses_configured_default() {
        let duration = config_with_default_hours(3).session_duration(None).unwrap();
        assert_eq!(duration, Duration::from_secs(3 * 3600));
    }

    #[test]
    fn test_session_duration_prefers_override() {
        let duration = config_with_default_hours(1)
            .session_duration(Some(12))
            .unwrap();
        assert_eq!(duration, Duration::from_secs(12 * 3600));
    }

    #[test]
    fn test_session_duration_rejects_out_of_range() {
        assert!(config_with_default_hours(1).session_duration(Some(13)).is_err());
        assert!(config_with_default_hours(1).session_duration(Some(0)).is_err());
        // A hand-edited config file is validated the same way
        assert!(config_with_default_hours(200).session_duration(None).is_err());
    }
}
