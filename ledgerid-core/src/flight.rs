use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use ledgerid_common::Result;

type Flight<T> = Shared<BoxFuture<'static, Result<T>>>;

/// Whether a caller started the work or joined a flight already under way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Leader,
    Follower,
}

/// Deduplicates concurrent work per key.
///
/// The first caller for a key starts the work; callers arriving while it is
/// in flight await the same future and receive a clone of its outcome
/// (success or failure). The entry is dropped once the work completes, so a
/// later call starts fresh. The shared future keeps running as long as any
/// caller still polls it, even if the one that started it is cancelled.
pub struct SingleFlight<T> {
    flights: Mutex<HashMap<String, Flight<T>>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            flights: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run<F, Fut>(&self, key: &str, work: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.run_with_role(key, work).await.1
    }

    /// Like [`run`](Self::run), also reporting whether this caller started the work.
    pub async fn run_with_role<F, Fut>(&self, key: &str, work: F) -> (Role, Result<T>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (role, flight) = {
            let mut flights = self.lock();
            match flights.get(key) {
                Some(existing) => {
                    tracing::debug!("Joining in-flight operation for {}", key);
                    (Role::Follower, existing.clone())
                }
                None => {
                    let started = work().boxed().shared();
                    flights.insert(key.to_string(), started.clone());
                    (Role::Leader, started)
                }
            }
        };

        let outcome = flight.clone().await;

        let mut flights = self.lock();
        if flights.get(key).map_or(false, |current| current.ptr_eq(&flight)) {
            flights.remove(key);
        }
        (role, outcome)
    }

    /// Number of keys with work currently in flight.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Flight<T>>> {
        // The map holds no invariants a panicking holder could break.
        self.flights.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use ledgerid_common::GatewayError;

    use super::*;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_execution() {
        let flights = Arc::new(SingleFlight::<usize>::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let callers = (0..10).map(|_| {
            let flights = flights.clone();
            let runs = runs.clone();
            tokio::spawn(async move {
                flights
                    .run("Org1", move || async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(runs.fetch_add(1, Ordering::SeqCst) + 1)
                    })
                    .await
            })
        });

        for result in futures::future::join_all(callers).await {
            assert_eq!(result.unwrap(), Ok(1));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_shared_then_cleared() {
        let flights = SingleFlight::<()>::new();

        let first = flights
            .run("Org2", || async { Err(GatewayError::EnrollmentFailed("bad secret".into())) })
            .await;
        assert_eq!(first, Err(GatewayError::EnrollmentFailed("bad secret".into())));

        let second = flights.run("Org2", || async { Ok(()) }).await;
        assert_eq!(second, Ok(()));
    }

    #[tokio::test]
    async fn test_only_the_first_caller_leads() {
        let flights = SingleFlight::<u8>::new();
        let slow = || async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(7)
        };

        let (first, second) = tokio::join!(
            flights.run_with_role("Org1/alice", slow),
            flights.run_with_role("Org1/alice", slow),
        );
        assert_eq!(first, (Role::Leader, Ok(7)));
        assert_eq!(second, (Role::Follower, Ok(7)));

        let (role, _) = flights.run_with_role("Org1/alice", slow).await;
        assert_eq!(role, Role::Leader);
    }

    #[tokio::test]
    async fn test_distinct_keys_run_independently() {
        let flights = SingleFlight::<&'static str>::new();
        let (a, b) = tokio::join!(
            flights.run("Org1/alice", || async { Ok("alice") }),
            flights.run("Org1/bob", || async { Ok("bob") }),
        );
        assert_eq!(a, Ok("alice"));
        assert_eq!(b, Ok("bob"));
    }
}
