//! Admission Controller
//!
//! Bounded permit pool gating concurrent acquisition pipelines. Saturation
//! policy is load-shedding: candidates arriving at capacity are dropped,
//! never queued. Permits are RAII guards, so release is unconditional on
//! every exit path of the task that holds one.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct PermitPool {
    active: AtomicUsize,
    max: usize,
}

/// Constructor-injected concurrency gate shared between the stream handler
/// and in-flight pipelines.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    pool: Arc<PermitPool>,
}

impl AdmissionController {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            pool: Arc::new(PermitPool {
                active: AtomicUsize::new(0),
                max: max_concurrent,
            }),
        }
    }

    /// Non-blocking acquisition. Returns `None` at capacity.
    pub fn try_acquire(&self) -> Option<AdmissionPermit> {
        let mut current = self.pool.active.load(Ordering::Acquire);
        loop {
            if current >= self.pool.max {
                return None;
            }
            match self.pool.active.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Some(AdmissionPermit {
                        pool: Arc::clone(&self.pool),
                    })
                }
                Err(observed) => current = observed,
            }
        }
    }

    /// Number of permits currently held.
    pub fn active(&self) -> usize {
        self.pool.active.load(Ordering::Acquire)
    }

    pub fn max_concurrent(&self) -> usize {
        self.pool.max
    }
}

/// One unit of allowed concurrent pipeline execution. Dropping the permit
/// releases its slot exactly once.
#[derive(Debug)]
pub struct AdmissionPermit {
    pool: Arc<PermitPool>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.pool.active.fetch_sub(1, Ordering::AcqRel);
    }
}
