use crate::store::StorePolicy;
use secrecy::SecretString;

/// Arguments shared by every server subsystem: counter store location and
/// failure policy, token signing secret, and the frontend origin.
#[derive(Clone)]
pub struct GlobalArgs {
    pub store_url: String,
    pub store_policy: StorePolicy,
    pub token_secret: SecretString,
    pub frontend_url: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(store_url: String, token_secret: SecretString) -> Self {
        Self {
            store_url,
            store_policy: StorePolicy::FailOpen,
            token_secret,
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("store_url", &self.store_url)
            .field("store_policy", &self.store_policy)
            .field("token_secret", &"***")
            .field("frontend_url", &self.frontend_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "redis://localhost:6379".to_string(),
            SecretString::from("secret".to_string()),
        );
        assert_eq!(args.store_url, "redis://localhost:6379");
        assert_eq!(args.store_policy, StorePolicy::FailOpen);
        assert_eq!(args.frontend_url, "http://localhost:5173");
        // Debug output must never leak the signing secret
        assert!(!format!("{args:?}").contains("secret\""));
    }
}
