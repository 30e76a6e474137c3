use async_trait::async_trait;
use ledgerid_common::{Identity, Result};

/// Durable label → identity mapping for a single organization.
///
/// Implementations must make `put` durable before returning and must never
/// expose a partially written record to a concurrent `get`.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Returns the identity stored under `label`. A malformed label is simply absent.
    async fn get(&self, label: &str) -> Result<Option<Identity>>;

    /// Upserts `identity` under `label`, replacing any previous entry.
    async fn put(&self, label: &str, identity: &Identity) -> Result<()>;

    async fn contains(&self, label: &str) -> Result<bool> {
        Ok(self.get(label).await?.is_some())
    }

    /// Labels currently stored, sorted.
    async fn list(&self) -> Result<Vec<String>>;
}

/// Labels double as file names, so they are restricted to a safe alphabet.
pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 255
        && !label.starts_with('.')
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
}
