//! Access token generation

use rand::{distributions::Alphanumeric, Rng};

/// Default token length, matching the original 20-character credential.
pub const DEFAULT_TOKEN_LEN: usize = 20;

/// Generates opaque random access tokens.
///
/// Tokens substitute for a password, so unpredictability is the primary
/// security property: `thread_rng` is a CSPRNG. The generator is
/// stateless and safe to call concurrently.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    len: usize,
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self {
            len: DEFAULT_TOKEN_LEN,
        }
    }

    /// Custom token length, mainly for tests.
    pub fn with_len(len: usize) -> Self {
        Self { len }
    }

    /// Generate a fresh alphanumeric token. Infallible.
    pub fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.len)
            .map(char::from)
            .collect()
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}
