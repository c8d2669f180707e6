//! Throwaway PIN challenge gating entry to the scenario picker.
//!
//! This is UX friction, not access control: a 4-character token from a
//! 36-symbol alphabet, no lockout, no retry limit.

use std::fmt;

/// Symbols a token is drawn from.
pub const TOKEN_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Characters per token.
pub const TOKEN_LEN: usize = 4;

/// A live or displayed gate token. Always `TOKEN_LEN` upper-case alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn matches(&self, candidate: &str) -> bool {
        self.0.eq_ignore_ascii_case(candidate.trim())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of uniformly distributed indices for token generation.
pub trait TokenSource {
    /// An index in `0..bound`.
    fn next_index(&mut self, bound: usize) -> usize;
}

/// Thread-local RNG from the `rand` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl TokenSource for ThreadRngSource {
    fn next_index(&mut self, bound: usize) -> usize {
        rand::random_range(0..bound)
    }
}

/// Issues and verifies the single live token.
#[derive(Debug, Default)]
pub struct CredentialGate<S = ThreadRngSource> {
    source: S,
    live: Option<Token>,
}

impl CredentialGate<ThreadRngSource> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: TokenSource> CredentialGate<S> {
    #[must_use]
    pub fn with_source(source: S) -> Self {
        Self { source, live: None }
    }

    /// Generate a fresh token, replacing (and permanently invalidating) any live one.
    pub fn issue(&mut self) -> Token {
        let token: String = (0..TOKEN_LEN)
            .map(|_| {
                let idx = self.source.next_index(TOKEN_ALPHABET.len()) % TOKEN_ALPHABET.len();
                char::from(TOKEN_ALPHABET[idx])
            })
            .collect();
        let token = Token(token);
        if self.live.replace(token.clone()).is_some() {
            tracing::debug!("Replaced live gate token");
        }
        token
    }

    /// Check `candidate` against the live token.
    ///
    /// Matching trims whitespace and ignores case. A match consumes the token;
    /// a mismatch leaves it live so the user can retry.
    pub fn verify(&mut self, candidate: &str) -> bool {
        let matched = self.live.as_ref().is_some_and(|live| live.matches(candidate));
        if matched {
            self.live = None;
        }
        matched
    }

    /// Invalidate the live token without verifying it.
    pub fn close(&mut self) {
        self.live = None;
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// The token awaiting verification, for display in the challenge prompt.
    #[must_use]
    pub fn live(&self) -> Option<&Token> {
        self.live.as_ref()
    }
}
