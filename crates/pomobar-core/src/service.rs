//! Async host for the timer engine.
//!
//! One task owns the [`TimerEngine`] and is the only place it is mutated.
//! Commands arrive over an mpsc channel, settings changes over the store's
//! watch channel, and the task sleeps until the engine's next deadline in
//! between. State goes out as a watched [`TimerSnapshot`] plus a broadcast
//! of [`Event`]s.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::notify::{AlertCatalog, Notifier};
use crate::storage::{Config, SettingsStore};
use crate::timer::{Clock, TimerEngine, TimerMode, TimerSnapshot, TokioClock};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Reset,
    ResetFullCycle,
    Skip,
    SwitchMode { mode: TimerMode, reset_index: bool },
    ResetCounters,
    Shutdown,
}

#[derive(Debug)]
struct Envelope {
    command: Command,
    reply: oneshot::Sender<TimerSnapshot>,
}

/// Cloneable client for a running [`TimerService`].
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<Envelope>,
    snapshot: watch::Receiver<TimerSnapshot>,
    events: broadcast::Sender<Event>,
}

impl TimerHandle {
    /// Send a command and wait until the service has applied it.
    pub async fn send(&self, command: Command) -> Result<TimerSnapshot> {
        let (reply, done) = oneshot::channel();
        self.commands
            .send(Envelope { command, reply })
            .await
            .map_err(|_| CoreError::ServiceClosed)?;
        done.await.map_err(|_| CoreError::ServiceClosed)
    }

    pub async fn start(&self) -> Result<TimerSnapshot> {
        self.send(Command::Start).await
    }

    pub async fn pause(&self) -> Result<TimerSnapshot> {
        self.send(Command::Pause).await
    }

    pub async fn toggle(&self) -> Result<TimerSnapshot> {
        self.send(Command::Toggle).await
    }

    pub async fn reset(&self) -> Result<TimerSnapshot> {
        self.send(Command::Reset).await
    }

    pub async fn reset_full_cycle(&self) -> Result<TimerSnapshot> {
        self.send(Command::ResetFullCycle).await
    }

    pub async fn skip(&self) -> Result<TimerSnapshot> {
        self.send(Command::Skip).await
    }

    pub async fn switch_mode(&self, mode: TimerMode, reset_index: bool) -> Result<TimerSnapshot> {
        self.send(Command::SwitchMode { mode, reset_index }).await
    }

    pub async fn reset_counters(&self) -> Result<TimerSnapshot> {
        self.send(Command::ResetCounters).await
    }

    pub async fn shutdown(&self) -> Result<TimerSnapshot> {
        self.send(Command::Shutdown).await
    }

    /// Latest published state.
    pub fn snapshot(&self) -> TimerSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

pub struct TimerService {
    engine: TimerEngine,
    commands: mpsc::Receiver<Envelope>,
    settings: watch::Receiver<Config>,
    store: SettingsStore,
    notifier: Arc<dyn Notifier>,
    alerts: AlertCatalog,
    snapshot_tx: watch::Sender<TimerSnapshot>,
    events_tx: broadcast::Sender<Event>,
}

impl TimerService {
    pub fn new(store: SettingsStore, notifier: Arc<dyn Notifier>) -> (Self, TimerHandle) {
        Self::with_clock(store, notifier, Arc::new(TokioClock))
    }

    pub fn with_clock(
        store: SettingsStore,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> (Self, TimerHandle) {
        let mut settings = store.subscribe();
        let engine = TimerEngine::with_clock(settings.borrow_and_update().clone(), clock);
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);

        let handle = TimerHandle {
            commands: commands_tx,
            snapshot: snapshot_rx,
            events: events_tx.clone(),
        };
        let service = Self {
            engine,
            commands,
            settings,
            store,
            notifier,
            alerts: AlertCatalog::default(),
            snapshot_tx,
            events_tx,
        };
        (service, handle)
    }

    pub fn with_alerts(mut self, alerts: AlertCatalog) -> Self {
        self.alerts = alerts;
        self
    }

    /// Build the service and run it on the current runtime.
    pub fn spawn(store: SettingsStore, notifier: Arc<dyn Notifier>) -> (TimerHandle, JoinHandle<()>) {
        let (service, handle) = Self::new(store, notifier);
        (handle, tokio::spawn(service.run()))
    }

    /// Run until shut down or every handle is dropped.
    pub async fn run(mut self) {
        let mut settings_open = true;
        loop {
            let deadline = self.engine.next_deadline();
            let (events, reply) = tokio::select! {
                envelope = self.commands.recv() => match envelope {
                    None => break,
                    Some(Envelope { command: Command::Shutdown, reply }) => {
                        let _ = reply.send(self.engine.snapshot());
                        break;
                    }
                    Some(Envelope { command, reply }) => (self.execute(command), Some(reply)),
                },
                changed = self.settings.changed(), if settings_open => match changed {
                    Ok(()) => {
                        let config = self.settings.borrow_and_update().clone();
                        (self.engine.apply_config(config), None)
                    }
                    Err(_) => {
                        debug!("settings store dropped; no further reconciliation");
                        settings_open = false;
                        (Vec::new(), None)
                    }
                },
                _ = sleep_until(deadline) => (self.engine.poll(), None),
            };

            self.dispatch(events);
            self.publish();
            if let Some(reply) = reply {
                let _ = reply.send(self.engine.snapshot());
            }
        }
        self.engine.pause();
        self.publish();
        debug!("timer service stopped");
    }

    fn execute(&mut self, command: Command) -> Vec<Event> {
        debug!(?command, "command");
        match command {
            Command::Start => self.engine.start().into_iter().collect(),
            Command::Pause => self.engine.pause().into_iter().collect(),
            Command::Toggle => self.engine.toggle().into_iter().collect(),
            Command::Reset => self.engine.reset().into_iter().collect(),
            Command::ResetFullCycle => self.engine.reset_full_cycle().into_iter().collect(),
            Command::Skip => self.engine.skip_current_step(),
            Command::SwitchMode { mode, reset_index } => {
                self.engine.switch_mode(mode, reset_index).into_iter().collect()
            }
            Command::ResetCounters => self.engine.reset_counters().into_iter().collect(),
            Command::Shutdown => Vec::new(),
        }
    }

    fn dispatch(&self, events: Vec<Event>) {
        let mut counters_changed = false;
        for event in events {
            match &event {
                Event::PlaySound { sound, .. } => self.notifier.play_sound(sound),
                Event::ShowAlert {
                    mode,
                    scale,
                    duration_secs,
                    ..
                } => {
                    let alert =
                        self.alerts
                            .compose(*mode, *scale, *duration_secs, &mut rand::thread_rng());
                    self.notifier.show_alert(&alert);
                }
                _ => {}
            }
            counters_changed |= event.changes_counters();
            // No subscribers is fine.
            let _ = self.events_tx.send(event);
        }

        if counters_changed {
            if let Err(e) = self.store.record_counters(self.engine.counters()) {
                warn!(error = %e, "failed to persist counters");
            }
        }
    }

    fn publish(&self) {
        let next = self.engine.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}
