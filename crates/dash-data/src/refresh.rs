//! Periodic refresh timers for bound widgets

use std::time::Duration;

use dash_core::DataSourceConfig;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Disposer of an armed refresh timer
///
/// Dropping the handle stops the timer. A callback already running is not
/// interrupted; only future fires are prevented.
#[derive(Debug)]
pub struct RefreshHandle {
    stop: Option<oneshot::Sender<()>>,
    period: Duration,
}

impl RefreshHandle {
    /// Stop the timer
    pub fn cancel(mut self) {
        self.stop_timer();
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether the timer task is still running
    pub fn is_active(&self) -> bool {
        self.stop.as_ref().is_some_and(|stop| !stop.is_closed())
    }

    fn stop_timer(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

/// Arm a timer calling `callback` every refresh interval of `config`
///
/// Returns `None` when refreshing is disabled, the interval is not
/// positive, or no Tokio runtime is available. The first call happens one
/// full interval after arming.
pub fn create_refresh_timer<F>(config: Option<&DataSourceConfig>, mut callback: F) -> Option<RefreshHandle>
where
    F: FnMut() + Send + 'static,
{
    let period = config?.refresh_period()?;
    let runtime = match Handle::try_current() {
        Ok(runtime) => runtime,
        Err(_) => {
            warn!("no Tokio runtime available, refresh timer not armed");
            return None;
        }
    };

    let (stop, mut stopped) = oneshot::channel::<()>();
    let first_fire = Instant::now() + period;
    runtime.spawn(async move {
        let mut ticker = interval_at(first_fire, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut stopped => break,
                _ = ticker.tick() => callback(),
            }
        }
        debug!(period_ms = period.as_millis() as u64, "refresh timer stopped");
    });

    debug!(period_ms = period.as_millis() as u64, "refresh timer armed");
    Some(RefreshHandle {
        stop: Some(stop),
        period,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = count.clone();
        (count, move || {
            sink.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_every_interval_until_dropped() {
        let (count, callback) = counter();
        let config = DataSourceConfig::named("cpu").with_refresh(5.0);
        let handle = create_refresh_timer(Some(&config), callback).unwrap();
        assert_eq!(handle.period(), Duration::from_secs(5));
        assert!(handle.is_active());

        sleep(Duration::from_millis(4_900)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        drop(handle);
        sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_future_fires() {
        let (count, callback) = counter();
        let config = DataSourceConfig::named("cpu").with_refresh(1.0);
        let handle = create_refresh_timer(Some(&config), callback).unwrap();

        sleep(Duration::from_millis(2_500)).await;
        handle.cancel();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disabled_refresh_arms_nothing() {
        let (_, callback) = counter();
        assert!(create_refresh_timer(None, callback).is_none());

        let (_, callback) = counter();
        let config = DataSourceConfig::named("cpu");
        assert!(create_refresh_timer(Some(&config), callback).is_none());

        let (_, callback) = counter();
        let config = DataSourceConfig::named("cpu").with_refresh(-1.0);
        assert!(create_refresh_timer(Some(&config), callback).is_none());
    }

    #[test]
    fn test_requires_runtime() {
        let (_, callback) = counter();
        let config = DataSourceConfig::named("cpu").with_refresh(1.0);
        assert!(create_refresh_timer(Some(&config), callback).is_none());
    }
}
