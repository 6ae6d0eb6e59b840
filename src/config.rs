use std::env;

use anyhow::Result;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Nothing
/// here is required just to parse the CLI; operations that need the term
/// dictionary call [`Config::require_terms`] and get a pointed message
/// when it is missing.
pub struct Config {
    /// Path to the suspicious-terms file (WATCHWORD_TERMS). A --terms
    /// flag on the command line overrides it per invocation.
    pub terms_path: Option<String>,
    /// Table column holding the communication text (WATCHWORD_COLUMN,
    /// defaults to "text").
    pub text_column: String,
}

impl Config {
    /// Load configuration from environment variables. Only the text
    /// column has a default.
    pub fn load() -> Result<Self> {
        Ok(Self {
            terms_path: env::var("WATCHWORD_TERMS").ok(),
            text_column: env::var("WATCHWORD_COLUMN").unwrap_or_else(|_| "text".to_string()),
        })
    }

    /// Resolve the terms file path, preferring the CLI flag over the
    /// environment. Bails with setup instructions when neither is set.
    pub fn require_terms<'a>(&'a self, flag: Option<&'a str>) -> Result<&'a str> {
        match flag.or(self.terms_path.as_deref()) {
            Some(path) => Ok(path),
            None => anyhow::bail!(
                "No terms file configured. Pass --terms <path> or set\n\
                 WATCHWORD_TERMS in the environment or your .env file."
            ),
        }
    }
}
