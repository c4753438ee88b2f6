use std::env;

/// Source of the bearer token issued by the identity provider.
pub trait TokenProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool {
        self.current_token().is_some()
    }
}

/// Token fixed at construction time.
#[derive(Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Read `INTERVIEW_API_TOKEN`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(env::var("INTERVIEW_API_TOKEN").ok())
    }
}

impl TokenProvider for StaticTokenProvider {
    fn current_token(&self) -> Option<String> {
        self.token.clone()
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_unauthenticated() {
        assert!(!StaticTokenProvider::new(Some("  ".into())).is_authenticated());
        assert!(!StaticTokenProvider::new(None).is_authenticated());
        assert!(StaticTokenProvider::new(Some("t0k".into())).is_authenticated());
    }

    #[test]
    fn debug_does_not_leak_token() {
        let rendered = format!("{:?}", StaticTokenProvider::new(Some("secret".into())));
        assert!(!rendered.contains("secret"));
    }
}
