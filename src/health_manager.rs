//! Committee health management
//!
//! This module implements the validator health manager:
//! - Liveness tracking for every active committee member
//! - Silent-validator detection against the inactivity threshold
//! - Deterministic standby selection from the address-ordered backup pool
//! - Switch request emission and outcome application
//! - Supervised background task with graceful shutdown
//!
//! The manager owns all health records. Structural changes to the active
//! set and backup pool are serialized under one mutex; the ticker only
//! holds it long enough to snapshot the active records, then advances
//! their atomic counters outside the lock.

use crate::error::{Error, Result};
use crate::health::{sort_by_address, Health, HealthReport, HealthState, HEALTH_OUT};
use crate::service::{Lifecycle, ServiceState};
use crate::switch::{SwitchEvent, SwitchOrigin, SwitchValidator};
use crate::validator::PeerId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Tick period in milliseconds
pub const TICK_INTERVAL_MS: u64 = 1_000;

/// Health manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Silent ticks tolerated before a switch is requested
    pub health_out: i32,

    /// Tick period (milliseconds)
    pub tick_interval_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            health_out: HEALTH_OUT,              // 600 seconds of silence
            tick_interval_ms: TICK_INTERVAL_MS,  // 1 Hz
        }
    }
}

/// Per-state record counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Records serving in the active set
    pub active: usize,

    /// Standby records eligible for promotion
    pub standby: usize,

    /// Records on either side of an in-flight switch
    pub switching: usize,

    /// Retired records
    pub retired: usize,
}

/// The manager's record containers, guarded by one mutex
#[derive(Default)]
struct Sets {
    /// Serving validators by peer id
    active: HashMap<PeerId, Arc<Health>>,

    /// Standby validators, ascending by validator address
    backup: Vec<Arc<Health>>,

    /// Switched-out validators
    retired: Vec<Arc<Health>>,

    /// Applied switch outcomes
    history: Vec<SwitchEvent>,
}

/// Validator health manager
///
/// Tracks peer liveness for the committee, requests the replacement of
/// silent validators, and applies the coordinator's switch outcomes.
/// Single-shot: once stopped it cannot be restarted.
pub struct HealthManager {
    /// Configuration
    config: HealthConfig,

    /// Start/stop state machine
    lifecycle: Lifecycle,

    /// Record containers
    sets: Arc<Mutex<Sets>>,

    /// Outgoing switch requests, capacity 1, drop-on-full
    switch_tx: mpsc::Sender<SwitchValidator>,

    /// Receiver handed to the consensus coordinator
    switch_rx: Option<mpsc::Receiver<SwitchValidator>>,

    /// Switch outcome inbox
    result_tx: mpsc::UnboundedSender<SwitchValidator>,

    /// Inbox receiver, consumed by the background task
    result_rx: Option<mpsc::UnboundedReceiver<SwitchValidator>>,

    /// Quit signal for the background task
    shutdown_tx: Option<mpsc::Sender<()>>,

    /// Background task handle
    task: Option<JoinHandle<()>>,
}

impl HealthManager {
    /// Create an idle manager with empty sets and default configuration
    pub fn new() -> Self {
        Self::with_config(HealthConfig::default())
    }

    /// Create an idle manager with the given configuration
    pub fn with_config(config: HealthConfig) -> Self {
        let (switch_tx, switch_rx) = mpsc::channel(1);
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        Self {
            config,
            lifecycle: Lifecycle::new("health manager"),
            sets: Arc::new(Mutex::new(Sets::default())),
            switch_tx,
            switch_rx: Some(switch_rx),
            result_tx,
            result_rx: Some(result_rx),
            shutdown_tx: None,
            task: None,
        }
    }

    /// Replace the active set
    ///
    /// Records are keyed by their own peer id; ids must be unique across
    /// the active set and backup pool combined. Callable only before
    /// `start`.
    pub fn set_active(&mut self, records: Vec<Health>) -> Result<()> {
        self.ensure_idle("set_active")?;

        let mut sets = self.sets.lock();
        sets.active = records
            .into_iter()
            .map(|record| (record.peer_id().clone(), Arc::new(record)))
            .collect();

        info!("active set configured with {} validators", sets.active.len());
        Ok(())
    }

    /// Replace the backup pool
    ///
    /// The pool is re-sorted ascending by validator address, which fixes
    /// the promotion order. Callable only before `start`.
    pub fn set_backup(&mut self, records: Vec<Health>) -> Result<()> {
        self.ensure_idle("set_backup")?;

        let mut sets = self.sets.lock();
        sets.backup = records.into_iter().map(Arc::new).collect();
        sort_by_address(&mut sets.backup);

        info!("backup pool configured with {} validators", sets.backup.len());
        Ok(())
    }

    /// Start the background tick task
    ///
    /// Re-entrant calls while running are no-ops. Fails with
    /// `InvalidState` once the manager has been stopped.
    pub async fn start(&mut self) -> Result<()> {
        if !self.lifecycle.begin_start()? {
            debug!("health manager already running");
            return Ok(());
        }

        let result_rx = match self.result_rx.take() {
            Some(rx) => rx,
            None => {
                return Err(Error::InvalidState(
                    "health manager inbox already consumed".to_string(),
                ))
            }
        };

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        self.task = Some(tokio::spawn(Self::run(
            self.config.clone(),
            Arc::clone(&self.sets),
            self.switch_tx.clone(),
            result_rx,
            shutdown_rx,
        )));

        info!("health manager started");
        Ok(())
    }

    /// Stop the background task and wait for it to exit
    ///
    /// Idempotent; the task observes the quit signal within one tick
    /// period.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.lifecycle.begin_stop() {
            debug!("health manager not running");
            return Ok(());
        }

        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            if shutdown_tx.send(()).await.is_err() {
                warn!("health manager task exited before quit signal");
            }
        }

        if let Some(task) = self.task.take() {
            if task.await.is_err() {
                warn!("health manager task ended abnormally");
            }
        }

        info!("health manager stopped");
        Ok(())
    }

    /// Liveness signal for an active validator
    ///
    /// Resets the peer's inactivity counter. Signals for peers outside
    /// the active set, for records already in the switch protocol, and
    /// for stopped managers are ignored.
    pub fn update(&self, peer_id: &PeerId) {
        if self.lifecycle.state() == ServiceState::Stopped {
            debug!("liveness signal for {} after stop, ignored", peer_id);
            return;
        }

        let sets = self.sets.lock();
        match sets.active.get(peer_id) {
            Some(record) if record.state() == HealthState::Used => record.reset_tick(),
            Some(record) => debug!(
                "liveness signal for {} in state {}, ignored",
                peer_id,
                record.state()
            ),
            None => debug!("liveness signal for unknown peer {}, ignored", peer_id),
        }
    }

    /// Deliver a switch outcome from the consensus coordinator
    ///
    /// Queued to the background task; only outcomes with remote origin
    /// are applied.
    pub fn switch_result(&self, outcome: SwitchValidator) {
        if self.result_tx.send(outcome).is_err() {
            debug!("health manager task gone, switch outcome dropped");
        }
    }

    /// Take the receiver for outgoing switch requests
    ///
    /// The consensus coordinator drains this channel. Returns `None` if
    /// already taken.
    pub fn take_switch_receiver(&mut self) -> Option<mpsc::Receiver<SwitchValidator>> {
        self.switch_rx.take()
    }

    /// Current lifecycle state
    pub fn service_state(&self) -> ServiceState {
        self.lifecycle.state()
    }

    /// Configuration
    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Active set size
    pub fn active_count(&self) -> usize {
        self.sets.lock().active.len()
    }

    /// Backup pool size
    pub fn backup_count(&self) -> usize {
        self.sets.lock().backup.len()
    }

    /// Per-state record counts
    pub fn status(&self) -> HealthStatus {
        let sets = self.sets.lock();
        let switching = sets
            .active
            .values()
            .chain(sets.backup.iter())
            .filter(|record| record.state() == HealthState::Switching)
            .count();

        HealthStatus {
            active: sets
                .active
                .values()
                .filter(|record| record.state() == HealthState::Used)
                .count(),
            standby: sets
                .backup
                .iter()
                .filter(|record| record.state() == HealthState::Unused)
                .count(),
            switching,
            retired: sets.retired.len(),
        }
    }

    /// Snapshots of every record: active, then backup in pool order,
    /// then retired
    pub fn report(&self) -> Vec<HealthReport> {
        let sets = self.sets.lock();
        sets.active
            .values()
            .chain(sets.backup.iter())
            .chain(sets.retired.iter())
            .map(|record| record.report())
            .collect()
    }

    /// Snapshot of one record, wherever it lives
    pub fn peer_report(&self, peer_id: &PeerId) -> Option<HealthReport> {
        let sets = self.sets.lock();
        sets.active
            .get(peer_id)
            .map(|record| record.report())
            .or_else(|| {
                sets.backup
                    .iter()
                    .chain(sets.retired.iter())
                    .find(|record| record.peer_id() == peer_id)
                    .map(|record| record.report())
            })
    }

    /// Applied switch outcomes, oldest first
    pub fn switch_history(&self) -> Vec<SwitchEvent> {
        self.sets.lock().history.clone()
    }

    fn ensure_idle(&self, operation: &str) -> Result<()> {
        if self.lifecycle.is_idle() {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "{} requires an idle manager, current state {}",
                operation,
                self.lifecycle.state()
            )))
        }
    }

    /// Background task: three-way wait on the ticker, the outcome inbox,
    /// and the quit signal
    async fn run(
        config: HealthConfig,
        sets: Arc<Mutex<Sets>>,
        switch_tx: mpsc::Sender<SwitchValidator>,
        mut result_rx: mpsc::UnboundedReceiver<SwitchValidator>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let period = Duration::from_millis(config.tick_interval_ms);
        let mut ticker = interval_at(Instant::now() + period, period);
        // A paused task delays detection; it must not burst catch-up ticks.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    Self::tick_once(&sets, &switch_tx, config.health_out);
                }
                Some(outcome) = result_rx.recv() => {
                    Self::apply_outcome(&sets, outcome);
                }
                _ = shutdown_rx.recv() => {
                    info!("health manager quit");
                    break;
                }
            }
        }
    }

    /// One tick: advance every serving record and check thresholds
    ///
    /// Operates on a snapshot of the active set; membership changes made
    /// while iterating take effect next tick.
    fn tick_once(sets: &Mutex<Sets>, switch_tx: &mpsc::Sender<SwitchValidator>, health_out: i32) {
        let snapshot: Vec<Arc<Health>> = sets.lock().active.values().cloned().collect();

        for record in snapshot {
            if record.state() == HealthState::Used {
                record.advance_tick();
            }
            Self::check_switch(sets, switch_tx, health_out, &record);
        }
    }

    /// Request a switch when a serving record crossed the threshold
    fn check_switch(
        sets: &Mutex<Sets>,
        switch_tx: &mpsc::Sender<SwitchValidator>,
        health_out: i32,
        record: &Arc<Health>,
    ) {
        if record.tick() <= health_out || record.state() != HealthState::Used {
            return;
        }

        let request = {
            let mut sets = sets.lock();
            let candidate = match Self::pick_unused(&mut sets) {
                Some(candidate) => candidate,
                None => {
                    debug!("no standby available to replace {}", record.peer_id());
                    return;
                }
            };
            record.set_state(HealthState::Switching);
            SwitchValidator::request(record.peer_id().clone(), candidate.peer_id().clone())
        };

        info!(
            "validator {} silent for {} ticks, requesting {}",
            record.peer_id(),
            record.tick(),
            request
        );
        if switch_tx.try_send(request).is_err() {
            info!("{}, no coordinator receiver ready", Error::DispatchDropped);
        }
    }

    /// Take the first `Unused` record from the pool, marking it
    /// `Switching`
    ///
    /// The pool is address-sorted, so repeated picks walk it in
    /// ascending address order. This is the only place a pool record
    /// enters `Switching`.
    fn pick_unused(sets: &mut Sets) -> Option<Arc<Health>> {
        for record in &sets.backup {
            if record.state() == HealthState::Unused {
                record.set_state(HealthState::Switching);
                return Some(Arc::clone(record));
            }
        }
        None
    }

    /// Apply a switch outcome under the manager mutex
    fn apply_outcome(sets: &Mutex<Sets>, outcome: SwitchValidator) {
        if outcome.origin != SwitchOrigin::Remote {
            debug!("discarding switch outcome without remote origin: {}", outcome);
            return;
        }

        let mut sets = sets.lock();
        if outcome.is_success() {
            Self::commit_switch(&mut sets, &outcome);
        } else {
            Self::revert_switch(&mut sets, &outcome);
        }
        sets.history.push(SwitchEvent::new(&outcome));
    }

    /// Successful switch: retire the outgoing record, promote the
    /// candidate into the active set with a fresh counter
    fn commit_switch(sets: &mut Sets, outcome: &SwitchValidator) {
        match sets.active.remove(&outcome.remove) {
            Some(record) => {
                record.set_state(HealthState::Removed);
                info!("switch validator success, retired {}", record);
                sets.retired.push(record);
            }
            None => warn!("switch outcome ignored on remove side: {}", Error::UnknownPeer(outcome.remove.clone())),
        }

        match sets.backup.iter().position(|record| record.peer_id() == &outcome.add) {
            Some(index) => {
                let record = sets.backup.remove(index);
                record.set_state(HealthState::Used);
                record.reset_tick();
                info!("switch validator success, promoted {}", record);
                sets.active.insert(record.peer_id().clone(), record);
            }
            None => warn!("switch outcome ignored on add side: {}", Error::UnknownPeer(outcome.add.clone())),
        }
    }

    /// Failed switch: both sides fall back to their previous states,
    /// the outgoing record keeps its counter
    fn revert_switch(sets: &mut Sets, outcome: &SwitchValidator) {
        match sets.active.get(&outcome.remove) {
            Some(record) if record.state() == HealthState::Switching => {
                record.set_state(HealthState::Used);
            }
            Some(record) => warn!(
                "switch failure outcome for {} in state {}, not reverted",
                record.peer_id(),
                record.state()
            ),
            None => warn!("switch outcome ignored on remove side: {}", Error::UnknownPeer(outcome.remove.clone())),
        }

        match sets.backup.iter().find(|record| record.peer_id() == &outcome.add) {
            Some(record) if record.state() == HealthState::Switching => {
                record.set_state(HealthState::Unused);
            }
            Some(record) => warn!(
                "switch failure outcome for {} in state {}, not reverted",
                record.peer_id(),
                record.state()
            ),
            None => warn!("switch outcome ignored on add side: {}", Error::UnknownPeer(outcome.add.clone())),
        }

        info!("switch validator failed, reason {:?}", outcome.reason);
    }
}

impl Default for HealthManager {
    fn default() -> Self {
        Self::new()
    }
}
