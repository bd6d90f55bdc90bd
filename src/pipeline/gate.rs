use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::oneshot;

/// A request parked until the in-flight refresh settles.
struct PendingRequest {
    resume: oneshot::Sender<String>,
}

#[derive(Default)]
struct GateState {
    refreshing: bool,
    pending: VecDeque<PendingRequest>,
}

/// Single-flight guard for token refresh.
///
/// The lock is only held for the flag flip and the queue push/take, never
/// across an await.
#[derive(Default)]
pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

pub(crate) enum Admission<'a> {
    /// This caller performs the refresh and must settle the lease.
    Leader(RefreshLease<'a>),
    /// A refresh is already running; wait for its token. A closed channel
    /// means the refresh failed.
    Waiter {
        resume: oneshot::Receiver<String>,
        depth: usize,
    },
}

impl RefreshGate {
    pub(crate) fn admit(&self) -> Admission<'_> {
        let mut state = self.lock();
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.pending.push_back(PendingRequest { resume: tx });
            Admission::Waiter {
                resume: rx,
                depth: state.pending.len(),
            }
        } else {
            state.refreshing = true;
            Admission::Leader(RefreshLease {
                gate: self,
                settled: false,
            })
        }
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    fn finish(&self) -> VecDeque<PendingRequest> {
        let mut state = self.lock();
        state.refreshing = false;
        std::mem::take(&mut state.pending)
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Held by the request that started the refresh. Dropping it unsettled
/// (the leader's future was cancelled) rejects the queue.
pub(crate) struct RefreshLease<'a> {
    gate: &'a RefreshGate,
    settled: bool,
}

impl RefreshLease<'_> {
    /// Clears the flag and hands `token` to every waiter in arrival order.
    pub(crate) fn resolve(mut self, token: &str) -> usize {
        self.settled = true;
        let pending = self.gate.finish();
        let resumed = pending.len();
        for waiter in pending {
            // A waiter whose caller went away has nothing left to resume.
            let _ = waiter.resume.send(token.to_string());
        }
        resumed
    }

    /// Clears the flag and drops every waiter without a token.
    pub(crate) fn reject(mut self) -> usize {
        self.settled = true;
        self.gate.finish().len()
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.gate.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};

    fn leader(gate: &RefreshGate) -> RefreshLease<'_> {
        match gate.admit() {
            Admission::Leader(lease) => lease,
            Admission::Waiter { .. } => panic!("expected to lead the refresh"),
        }
    }

    fn waiter(gate: &RefreshGate) -> oneshot::Receiver<String> {
        match gate.admit() {
            Admission::Waiter { resume, .. } => resume,
            Admission::Leader(_) => panic!("expected to wait behind the refresh"),
        }
    }

    #[test]
    fn only_first_caller_leads() {
        let gate = RefreshGate::default();
        let lease = leader(&gate);
        assert!(gate.is_refreshing());
        let _a = waiter(&gate);
        let _b = waiter(&gate);
        assert_eq!(gate.pending_len(), 2);

        assert_eq!(lease.resolve("fresh"), 2);
        assert!(!gate.is_refreshing());
        assert_eq!(gate.pending_len(), 0);

        // the next expiry starts a new cycle
        let _next = leader(&gate);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn waiters_resume_in_arrival_order() {
        let gate = RefreshGate::default();
        let lease = leader(&gate);
        let order = Arc::new(StdMutex::new(Vec::new()));

        let mut handles = Vec::new();
        for id in 0..5 {
            let resume = waiter(&gate);
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                let token = resume.await.expect("refresh should succeed");
                order.lock().unwrap().push((id, token));
            }));
        }
        tokio::task::yield_now().await;

        assert_eq!(lease.resolve("fresh"), 5);
        for handle in handles {
            handle.await.unwrap();
        }

        let order = order.lock().unwrap().clone();
        let ids: Vec<_> = order.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert!(order.iter().all(|(_, token)| token == "fresh"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn reject_closes_every_waiter() {
        let gate = RefreshGate::default();
        let lease = leader(&gate);
        let a = waiter(&gate);
        let b = waiter(&gate);

        assert_eq!(lease.reject(), 2);
        assert!(a.await.is_err());
        assert!(b.await.is_err());
        assert!(!gate.is_refreshing());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn dropped_lease_releases_the_gate() {
        let gate = RefreshGate::default();
        let lease = leader(&gate);
        let pending = waiter(&gate);
        drop(lease);

        assert!(pending.await.is_err());
        assert!(!gate.is_refreshing());
    }
}
