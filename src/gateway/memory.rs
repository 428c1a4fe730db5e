use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::{Change, Gateway, Snapshot};
use crate::errors::GatewayError;

/// Gateway holding its snapshot in memory.
///
/// While failing is switched on every call returns
/// [`GatewayError::Unavailable`] and nothing is recorded. Rejecting writes
/// fails only `apply`, so loads still see the last accepted state.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<Snapshot>,
    applied: Mutex<Vec<Change>>,
    failing: AtomicBool,
    reject_writes: AtomicBool,
}

impl MemoryGateway {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
            ..Default::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Result<Snapshot, GatewayError> {
        self.state
            .lock()
            .map(|s| s.clone())
            .map_err(|_| GatewayError::LockPoisoned)
    }

    /// Every change accepted so far, oldest first.
    pub fn applied(&self) -> Result<Vec<Change>, GatewayError> {
        self.applied
            .lock()
            .map(|a| a.clone())
            .map_err(|_| GatewayError::LockPoisoned)
    }

    fn check_available(&self) -> Result<(), GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("memory gateway switched off".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<Snapshot, GatewayError> {
        self.check_available()?;
        self.snapshot()
    }

    async fn apply(&self, change: &Change) -> Result<(), GatewayError> {
        self.check_available()?;
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("memory gateway rejects writes".into()));
        }
        self.state
            .lock()
            .map_err(|_| GatewayError::LockPoisoned)?
            .apply(change);
        self.applied
            .lock()
            .map_err(|_| GatewayError::LockPoisoned)?
            .push(change.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_gateway_records_changes() {
        let gateway = MemoryGateway::default();
        gateway.apply(&Change::BusinessMode(true)).await.unwrap();

        assert!(gateway.load().await.unwrap().business_mode);
        assert_eq!(gateway.applied().unwrap(), vec![Change::BusinessMode(true)]);
    }

    #[tokio::test]
    async fn test_memory_gateway_failure_switch() {
        let gateway = MemoryGateway::default();
        gateway.set_failing(true);

        let err = gateway.apply(&Change::MarkDemoSeeded).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable(_)));
        assert!(gateway.load().await.is_err());

        gateway.set_failing(false);
        assert!(!gateway.load().await.unwrap().demo_seeded);
        assert!(gateway.applied().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_writes_still_load() {
        let gateway = MemoryGateway::default();
        gateway.apply(&Change::BusinessMode(true)).await.unwrap();
        gateway.set_reject_writes(true);

        assert!(gateway.apply(&Change::BusinessMode(false)).await.is_err());
        assert!(gateway.load().await.unwrap().business_mode);
    }
}
