//! Stress tests for Rollcall.
//!
//! These helpers drive many read-modify-write cycles, sequentially or from
//! several threads, and report how many records actually landed.

use rollcall_core::{DocumentStore, Resources};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform in total.
    pub operations: usize,
    /// Number of concurrent threads (for concurrent tests).
    pub threads: usize,
    /// Collection the operations target.
    pub collection: String,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 200,
            threads: 4,
            collection: "stress".to_string(),
        }
    }
}

/// Outcome of concurrent creates.
#[derive(Debug, Clone)]
pub struct ConcurrentWriteReport {
    /// Per-operation results.
    pub result: StressTestResult,
    /// Records present in the collection afterwards.
    pub stored: usize,
}

impl ConcurrentWriteReport {
    /// Successful creates whose record was overwritten by a later writer.
    pub fn lost_updates(&self) -> usize {
        self.result.successful_ops.saturating_sub(self.stored)
    }
}

/// Run sequential creates.
pub fn stress_sequential_creates(resources: &Resources, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for seq in 0..config.operations {
        match resources.create(&config.collection, &json!({ "seq": seq })) {
            Ok(_) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run a mixed create/get/update/delete workload.
///
/// Every fourth operation targets an id that does not exist, so those
/// count as failures.
pub fn stress_mixed_operations(resources: &Resources, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;
    let mut ids: Vec<String> = Vec::new();

    for i in 0..config.operations {
        let result = match (i % 4, ids.last().cloned()) {
            (0, _) | (_, None) => resources
                .create(&config.collection, &json!({ "seq": i }))
                .map(|record| {
                    if let Some(id) = record["id"].as_str() {
                        ids.push(id.to_string());
                    }
                }),
            (1, Some(id)) => resources.get(&config.collection, &id).map(|_| ()),
            (2, Some(id)) => resources
                .update(&config.collection, &id, &json!({ "touched": i }))
                .map(|_| ()),
            (_, Some(_)) => resources
                .delete(&config.collection, "missing")
                .map(|_| ()),
        };

        match result {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run creates from several threads against one store.
///
/// Without exclusive writes, concurrent cycles may overwrite each other;
/// [`ConcurrentWriteReport::lost_updates`] counts how many did.
pub fn stress_concurrent_creates(
    store: Arc<DocumentStore>,
    config: &StressConfig,
) -> ConcurrentWriteReport {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let ops_per_thread = config.operations / config.threads.max(1);

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let resources = Resources::new(Arc::clone(&store));
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let collection = config.collection.clone();

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    match resources.create(&collection, &json!({ "thread": t, "seq": i })) {
                        Ok(_) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let result = StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    );
    let stored = store
        .get_collection(&config.collection)
        .map(|snapshot| snapshot.len())
        .unwrap_or(0);

    ConcurrentWriteReport { result, stored }
}
