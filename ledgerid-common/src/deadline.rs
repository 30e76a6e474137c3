use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// Per-category deadlines applied to every suspension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadlines {
    #[serde(rename = "ca_ms", with = "millis")]
    pub ca: Duration,
    #[serde(rename = "wallet_ms", with = "millis")]
    pub wallet: Duration,
    #[serde(rename = "network_ms", with = "millis")]
    pub network: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            ca: Duration::from_secs(10),
            wallet: Duration::from_secs(5),
            network: Duration::from_secs(30),
        }
    }
}

/// Runs `fut` under `limit`, mapping expiry to [`GatewayError::Timeout`].
pub async fn with_deadline<T, F>(limit: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{} exceeded its deadline of {:?}", operation, limit);
            Err(GatewayError::Timeout(operation.to_string()))
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_passes_result_through() {
        let out = with_deadline(Duration::from_millis(100), "noop", async { Ok(7) }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_timeout() {
        let out: Result<()> = with_deadline(Duration::from_millis(10), "wallet.get", async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;
        assert_eq!(out, Err(GatewayError::Timeout("wallet.get".into())));
    }

    #[test]
    fn test_deadlines_serialize_as_millis() {
        let json = serde_json::to_value(Deadlines::default()).unwrap();
        assert_eq!(json["ca_ms"], 10_000);
        assert_eq!(json["network_ms"], 30_000);
    }
}
