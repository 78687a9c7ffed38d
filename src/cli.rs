use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{
    AddCommand, AuthCommand, CheckCommand, CompletionsCommand, ConfigureCommand, EnvCommand,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "okaws", version, about = "AWS federated authentication tool for Okta", long_about = None, arg_required_else_help = false)]
pub struct Cli {
    #[arg(
        short = 'p',
        long,
        global = true,
        default_value = "default",
        help = "AWS profile name"
    )]
    pub profile: String,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Authenticate with AWS using Okta federation")]
    Auth(AuthCommand),
    #[command(about = "Register Okta credentials in the OS secret store")]
    Add(AddCommand),
    #[command(about = "Verify the stored Okta credentials still authenticate")]
    Check(CheckCommand),
    #[command(about = "Print AWS credentials as shell export statements")]
    Env(EnvCommand),
    #[command(about = "Configure Okta and AWS settings")]
    Configure(ConfigureCommand),
    #[command(about = "Generate shell completion scripts for okaws")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let profile = self.profile;
        let command = self.command.unwrap_or(Commands::Auth(AuthCommand {
            duration_hours: None,
        }));

        match command {
            Commands::Auth(cmd) => cmd.execute(&profile).await,
            Commands::Add(cmd) => cmd.execute().await,
            Commands::Check(cmd) => cmd.execute().await,
            Commands::Env(cmd) => cmd.execute(&profile).await,
            Commands::Configure(cmd) => cmd.execute(&profile).await,
            Commands::Completions(cmd) => {
                cmd.execute();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, error::ErrorKind};

    #[test]
    fn test_default_command_is_auth() {
        let cli = Cli {
            profile: "default".to_string(),
            verbose: 0,
            command: None,
        };

        match cli.command.unwrap_or(Commands::Auth(AuthCommand {
            duration_hours: None,
        })) {
            Commands::Auth(cmd) => assert_eq!(cmd.duration_hours, None),
            _ => panic!("Expected Auth command as default"),
        }
    }

    #[test]
    fn test_profile_default_value() {
        let cli = Cli::try_parse_from(["okaws", "auth"]).unwrap();
        assert_eq!(cli.profile, "default");
    }

    #[test]
    fn test_profile_custom_value() {
        let cli = Cli::try_parse_from(["okaws", "--profile", "production", "auth"]).unwrap();
        assert_eq!(cli.profile, "production");
    }

    #[test]
    fn test_profile_short_flag() {
        let cli = Cli::try_parse_from(["okaws", "-p", "dev", "auth"]).unwrap();
        assert_eq!(cli.profile, "dev");
    }

    #[test]
    fn test_auth_with_duration_parsing() {
        let cli = Cli::try_parse_from(["okaws", "auth", "--duration-hours", "8"]).unwrap();
        match cli.command {
            Some(Commands::Auth(cmd)) => {
                assert_eq!(cmd.duration_hours, Some(8));
            }
            _ => panic!("Expected Auth command"),
        }
    }

    #[test]
    fn test_auth_without_duration() {
        let cli = Cli::try_parse_from(["okaws", "auth"]).unwrap();
        match cli.command {
            Some(Commands::Auth(cmd)) => {
                assert_eq!(cmd.duration_hours, None);
            }
            _ => panic!("Expected Auth command"),
        }
    }

    #[test]
    fn test_add_command_parsing() {
        let cli = Cli::try_parse_from(["okaws", "add"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Add(_))));
    }

    #[test]
    fn test_check_command_parsing() {
        let cli = Cli::try_parse_from(["okaws", "check"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Check(_))));
    }

    #[test]
    fn test_env_command_parsing() {
        let cli = Cli::try_parse_from(["okaws", "env", "-p", "staging"]).unwrap();
        assert_eq!(cli.profile, "staging");
        assert!(matches!(cli.command, Some(Commands::Env(_))));
    }

    #[test]
    fn test_configure_command_parsing() {
        let cli = Cli::try_parse_from(["okaws", "configure"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Configure(_))));
    }

    #[test]
    fn test_completions_command_parsing() {
        let cli = Cli::try_parse_from(["okaws", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Completions(_))));
    }

    #[test]
    fn test_no_command_defaults_to_auth() {
        let cli = Cli::try_parse_from(["okaws"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_command_structure_validation() {
        let cmd = Cli::command();
        cmd.debug_assert();
    }

    #[test]
    fn test_invalid_command_fails() {
        let result = Cli::try_parse_from(["okaws", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag_works() {
        let result = Cli::try_parse_from(["okaws", "--help"]);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayHelp);
        }
    }

    #[test]
    fn test_version_flag_works() {
        let result = Cli::try_parse_from(["okaws", "--version"]);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayVersion);
        }
    }

    #[test]
    fn test_verbose_flag_single() {
        let cli = Cli::try_parse_from(["okaws", "-v", "auth"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_verbose_flag_multiple() {
        let cli = Cli::try_parse_from(["okaws", "-vvv", "auth"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_verbose_default_zero() {
        let cli = Cli::try_parse_from(["okaws", "auth"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }
}
