pub mod add;
pub mod auth;
pub mod check;
pub mod completions;
pub mod configure;
pub mod env;

pub use add::AddCommand;
pub use auth::AuthCommand;
pub use check::CheckCommand;
pub use completions::CompletionsCommand;
pub use configure::ConfigureCommand;
pub use env::EnvCommand;
