//! driver.rs
//!
//! The live clock: while configured, one tokio task sleeps until the next
//! wall-clock boundary of the cadence (a whole second, or a whole minute when
//! seconds are hidden), then samples the clock once per period and publishes a
//! fresh `Tick` to every subscriber.
//!
//! The alignment delay and the repeating phase are the same task, so aborting
//! it during the delay means the repeating phase never starts. Every
//! (re)configuration and teardown also bumps an epoch under the publish lock;
//! a timer only publishes while its epoch is current, so nothing from a
//! retired end date reaches subscribers once `configure`/`teardown` returns.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::projection::{Precision, Projection, Tick, WeekBuckets, project};

/// Source of "now" for every tick.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, sampled fresh at each tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

type Listener = Arc<dyn Fn(&Tick) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    by_id: BTreeMap<u64, Listener>,
}

#[derive(Default)]
struct Hub {
    // Lock order: epoch, then latest / listeners.
    epoch: Mutex<u64>,
    latest: Mutex<Option<Arc<Tick>>>,
    listeners: Mutex<Listeners>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Hub {
    /// Invalidates every running timer and returns the new epoch.
    fn retire(&self, latest: Option<Tick>) -> u64 {
        let mut epoch = lock(&self.epoch);
        *epoch += 1;
        *lock(&self.latest) = latest.map(Arc::new);
        *epoch
    }

    /// Returns false once `epoch` has been retired.
    fn publish(&self, epoch: u64, tick: Tick) -> bool {
        let current = lock(&self.epoch);
        if *current != epoch {
            return false;
        }

        let tick = Arc::new(tick);
        *lock(&self.latest) = Some(Arc::clone(&tick));

        let listeners: Vec<Listener> = lock(&self.listeners).by_id.values().cloned().collect();
        for listener in listeners {
            listener(&tick);
        }
        true
    }
}

/// Handle returned by [`LiveClock::subscribe`].
#[must_use = "keep the subscription to call unsubscribe() later"]
pub struct Subscription {
    id: u64,
    hub: Weak<Hub>,
}

impl Subscription {
    /// Stops delivery to this listener. A no-op if the driver is gone.
    pub fn unsubscribe(self) {
        if let Some(hub) = self.hub.upgrade() {
            lock(&hub.listeners).by_id.remove(&self.id);
        }
    }
}

enum State {
    Idle,
    Running {
        projection: Projection,
        timer: JoinHandle<()>,
    },
}

/// Owns the projection and the single timer task that republishes it.
pub struct LiveClock<C: Clock = SystemClock> {
    clock: Arc<C>,
    hub: Arc<Hub>,
    precision: Precision,
    state: State,
}

impl LiveClock<SystemClock> {
    pub fn new(precision: Precision) -> Self {
        Self::with_clock(SystemClock, precision)
    }
}

impl Default for LiveClock<SystemClock> {
    fn default() -> Self {
        Self::new(Precision::default())
    }
}

impl<C: Clock> LiveClock<C> {
    pub fn with_clock(clock: C, precision: Precision) -> Self {
        Self {
            clock: Arc::new(clock),
            hub: Arc::new(Hub::default()),
            precision,
            state: State::Idle,
        }
    }

    /// Projects a new end date and (re)starts the timer for it.
    ///
    /// Any previous timer is cancelled first. On error the driver is left Idle.
    pub fn configure(&mut self, birth: NaiveDate, lifespan_years: i32) -> Result<()> {
        self.stop();
        let projection = project(birth, lifespan_years)?;
        self.start(projection)
    }

    /// Cancels the timer, if any. Safe to call any number of times.
    pub fn teardown(&mut self) {
        if self.stop() {
            info!("live clock torn down");
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Tick) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.hub.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.by_id.insert(id, Arc::new(listener));

        Subscription {
            id,
            hub: Arc::downgrade(&self.hub),
        }
    }

    /// Week partition for the current configuration, or `None` while Idle.
    pub fn week_buckets(&self, now: DateTime<Utc>) -> Option<WeekBuckets> {
        self.projection().map(|p| p.week_buckets(now))
    }

    /// Switches between per-second and per-minute ticking.
    ///
    /// A running timer is restarted with the new cadence, so the change applies
    /// from the next scheduled tick. If the restart fails the driver is left Idle.
    pub fn set_seconds_precision(&mut self, enabled: bool) -> Result<()> {
        let precision = Precision::from_show_seconds(enabled);
        if precision == self.precision {
            return Ok(());
        }
        self.precision = precision;

        match self.projection() {
            Some(projection) => {
                self.stop();
                self.start(projection).inspect_err(|e| {
                    warn!("failed to restart live clock: {e}");
                })
            }
            None => Ok(()),
        }
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn projection(&self) -> Option<Projection> {
        match &self.state {
            State::Running { projection, .. } => Some(*projection),
            State::Idle => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// Most recent tick (or the sample taken at configuration time).
    pub fn latest(&self) -> Option<Arc<Tick>> {
        lock(&self.hub.latest).clone()
    }

    fn start(&mut self, projection: Projection) -> Result<()> {
        let runtime = Handle::try_current().map_err(|e| Error::TimerUnavailable(e.to_string()))?;

        let now = self.clock.now();
        let epoch = self.hub.retire(Some(projection.sample(now, self.precision)));
        let timer = runtime.spawn(run_timer(
            Arc::clone(&self.clock),
            Arc::clone(&self.hub),
            epoch,
            projection,
            self.precision,
        ));

        info!(
            "live clock running: birth {}, end {}, {:?} precision",
            projection.birth(),
            projection.end(),
            self.precision
        );
        self.state = State::Running { projection, timer };
        Ok(())
    }

    /// Returns true if a timer was running.
    fn stop(&mut self) -> bool {
        let was_running = match std::mem::replace(&mut self.state, State::Idle) {
            State::Running { timer, .. } => {
                timer.abort();
                true
            }
            State::Idle => false,
        };
        self.hub.retire(None);
        if was_running {
            debug!("live clock timer cancelled");
        }
        was_running
    }
}

impl<C: Clock> Drop for LiveClock<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Time until the next multiple of the cadence on the wall clock.
///
/// Exactly on a boundary this is a full period.
pub fn align_delay(now: DateTime<Utc>, precision: Precision) -> Duration {
    let period = precision.period_ms();
    let into_period = now.timestamp_millis().rem_euclid(period);
    Duration::from_millis((period - into_period) as u64)
}

async fn run_timer<C: Clock>(
    clock: Arc<C>,
    hub: Arc<Hub>,
    epoch: u64,
    projection: Projection,
    precision: Precision,
) {
    let first = Instant::now() + align_delay(clock.now(), precision);
    let mut ticks = interval_at(first, precision.period());
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticks.tick().await;
        let tick = projection.sample(clock.now(), precision);
        trace!("tick at {}: {:?}", tick.sampled_at, tick.countdown);
        if !hub.publish(epoch, tick) {
            break;
        }
    }
}
