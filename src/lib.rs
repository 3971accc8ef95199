//! Lingotutor - Daily English Practice Library
//!
//! A personal language-learning CLI that:
//! - asks the Gemini API to generate daily English practice exercises
//! - collects the learner's answers and asks the same model to grade them
//! - tracks grammar/translation weaknesses in a learner profile
//! - tracks per-word, per-form vocabulary mastery in SQLite
//! - feeds both back into the next day's exercise prompt
//!
//! # Example
//!
//! ```ignore
//! use lingotutor::gateway::GeminiClient;
//! use lingotutor::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let client = GeminiClient::from_config(&config)?;
//!     let generation = client.generate("Write a short English tip.").await?;
//!     println!("{}", generation.text);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod editor;
pub mod gateway;
pub mod profile;
pub mod prompts;
pub mod tasks;
pub mod tokens;
pub mod vocab;

// Re-export commonly used types for convenience
pub use config::Config;
pub use gateway::{GatewayError, GeminiClient, Generation};
pub use profile::{LearnerProfile, ProfileStore, WeaknessReport};
pub use tasks::TaskStore;
pub use tokens::TokenLedger;
pub use vocab::VocabStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
