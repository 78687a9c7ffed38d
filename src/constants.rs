use std::{env, path::PathBuf};

use dirs;

/// Okta server domain appended to the organization subdomain
pub const OKTA_SERVER: &str = "okta.com";

/// Service name the secret store entries are registered under
pub const KEYRING_SERVICE: &str = "okaws";

/// Secret store key holding the JSON-encoded Okta credentials
pub const OKTA_CREDS_KEY: &str = "okta-creds";

/// Secret store key holding the cached Okta session cookie
pub const OKTA_SESSION_COOKIE_KEY: &str = "okta-session-cookie";

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS configuration file name
pub const AWS_CONFIG_FILE_NAME: &str = "config";

/// Minimum session duration in hours
pub const MIN_SESSION_DURATION_HOURS: u8 = 1;

/// Maximum session duration in hours
pub const MAX_SESSION_DURATION_HOURS: u8 = 12;

/// Default session duration in hours
pub const DEFAULT_SESSION_DURATION_HOURS: u8 = 1;

/// Default AWS region for STS operations when no region is configured
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Get the AWS config file path
/// Respects AWS_CONFIG_FILE environment variable if set
pub fn get_aws_config_path() -> Option<PathBuf> {
    // Check environment variable first
    if let Ok(path) = env::var("AWS_CONFIG_FILE") {
        return Some(PathBuf::from(path));
    }

    // Use default AWS config location
    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME).join(AWS_CONFIG_FILE_NAME))
}

/// Get the AWS credentials file path
/// Respects AWS_SHARED_CREDENTIALS_FILE environment variable if set
pub fn get_aws_credentials_path() -> Option<PathBuf> {
    // Check environment variable first
    if let Ok(path) = env::var("AWS_SHARED_CREDENTIALS_FILE") {
        return Some(PathBuf::from(path));
    }

    // Use default AWS credentials location
    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME).join("credentials"))
}
