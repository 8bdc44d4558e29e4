use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A periodic cosmetic task. Dropping the ticker aborts it, so every exit
/// path of the owning operation cancels the timer.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Call `tick` every `period` (first call after one period) until it
    /// breaks or the ticker is stopped.
    pub fn spawn<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                if tick().is_break() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn stop(self) {}

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn ticks_until_break() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let ticker = Ticker::spawn(Duration::from_millis(5), move || {
            if seen.fetch_add(1, Ordering::SeqCst) + 1 >= 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        for _ in 0..200 {
            if ticker.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(ticker.is_finished());
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stop_cancels_further_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let ticker = Ticker::spawn(Duration::from_millis(5), move || {
            seen.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        });
        tokio::time::sleep(Duration::from_millis(30)).await;
        ticker.stop();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let after_stop = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }
}
