//! Bounded worker pool
//!
//! Fans a list of inputs over a fixed number of tokio tasks and returns the
//! results positionally aligned with the inputs. Cancellation abandons work
//! that has not yet been picked up; items already in flight run to
//! completion and keep whatever they produced.

use crate::error::{Error, Result};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// One processed unit of work: the input and what became of it.
pub struct Task<T, R> {
    pub input: T,
    pub result: Result<R>,
}

/// A generic worker pool with configurable concurrency.
pub struct Pool<F> {
    workers: usize,
    process: Arc<F>,
}

impl<F> Pool<F> {
    pub fn new(workers: usize, process: F) -> Self {
        Self {
            workers: workers.max(1),
            process: Arc::new(process),
        }
    }

    /// Runs all inputs through the pool. The returned vector has one entry
    /// per input, in input order; entries never started before cancellation
    /// carry `Error::Cancelled`.
    pub async fn execute<T, R, Fut>(
        &self,
        token: &CancellationToken,
        inputs: Vec<T>,
    ) -> Vec<Task<T, R>>
    where
        T: Clone + Send + Sync + 'static,
        R: Send + 'static,
        F: Fn(CancellationToken, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let total = inputs.len();
        let shared_inputs = Arc::new(inputs);
        let next_index = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, Result<R>)>();

        let mut handles = Vec::with_capacity(self.workers);
        for _ in 0..self.workers {
            let inputs = Arc::clone(&shared_inputs);
            let next = Arc::clone(&next_index);
            let process = Arc::clone(&self.process);
            let token = token.clone();
            let tx = tx.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    if token.is_cancelled() {
                        return;
                    }
                    let idx = next.fetch_add(1, Ordering::Relaxed);
                    if idx >= inputs.len() {
                        return;
                    }
                    let result = process(token.clone(), inputs[idx].clone()).await;
                    if let Err(e) = &result {
                        error!(error = %e, index = idx, "Task failed");
                    }
                    if tx.send((idx, result)).is_err() {
                        return;
                    }
                }
            }));
        }
        drop(tx);

        let mut slots: Vec<Option<Result<R>>> = (0..total).map(|_| None).collect();
        while let Some((idx, result)) = rx.recv().await {
            slots[idx] = Some(result);
        }
        for handle in handles {
            let _ = handle.await;
        }

        let inputs = Arc::try_unwrap(shared_inputs).unwrap_or_else(|arc| (*arc).clone());
        inputs
            .into_iter()
            .zip(slots)
            .map(|(input, slot)| Task {
                input,
                result: slot.unwrap_or(Err(Error::Cancelled)),
            })
            .collect()
    }
}

/// Splits items into consecutive chunks of at most `batch_size`, in order.
pub fn batch<T>(items: Vec<T>, batch_size: usize) -> Vec<Vec<T>> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::new();
    let mut current = Vec::with_capacity(batch_size);
    for item in items {
        current.push(item);
        if current.len() == batch_size {
            batches.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_results_align_with_inputs() {
        let pool = Pool::new(4, |_token: CancellationToken, n: usize| async move {
            Ok::<_, Error>(n * 2)
        });
        let token = CancellationToken::new();
        let results = pool.execute(&token, (0..50).collect()).await;

        assert_eq!(results.len(), 50);
        for (i, task) in results.iter().enumerate() {
            assert_eq!(task.input, i);
            assert_eq!(*task.result.as_ref().unwrap(), i * 2);
        }
    }

    #[tokio::test]
    async fn test_execute_keeps_per_item_errors() {
        let pool = Pool::new(2, |_token: CancellationToken, n: usize| async move {
            if n % 2 == 0 {
                Ok(n)
            } else {
                Err(Error::Other(format!("odd {}", n)))
            }
        });
        let token = CancellationToken::new();
        let results = pool.execute(&token, vec![0, 1, 2, 3]).await;

        assert!(results[0].result.is_ok());
        assert!(results[1].result.is_err());
        assert!(results[2].result.is_ok());
        assert!(results[3].result.is_err());
    }

    #[tokio::test]
    async fn test_execute_cancelled_before_start() {
        let pool = Pool::new(2, |_token: CancellationToken, n: usize| async move {
            Ok::<_, Error>(n)
        });
        let token = CancellationToken::new();
        token.cancel();
        let results = pool.execute(&token, vec![1, 2, 3]).await;

        assert_eq!(results.len(), 3);
        for task in &results {
            assert!(matches!(task.result, Err(Error::Cancelled)));
        }
    }

    #[test]
    fn test_batch_splits_preserving_order() {
        let batches = batch((1..=7).collect::<Vec<_>>(), 3);
        assert_eq!(batches, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
    }

    #[test]
    fn test_batch_size_clamped_to_one() {
        let batches = batch(vec![1, 2], 0);
        assert_eq!(batches, vec![vec![1], vec![2]]);
    }

    #[test]
    fn test_batch_empty() {
        let batches: Vec<Vec<i32>> = batch(Vec::new(), 5);
        assert!(batches.is_empty());
    }
}
