use crate::active::{fetch_active, ActiveSet};
use crate::command::CommandRunner;
use crate::error::FetchError;
use crate::reconcile::{reconcile, PanelPolicy, Reconciliation};
use crate::snapshot::{fetch_snapshot, ReportQuery};
use crate::table::TableModel;
use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    Tasks,
    Intervals,
}

impl PanelId {
    pub fn label(self) -> &'static str {
        match self {
            PanelId::Tasks => "tasks",
            PanelId::Intervals => "intervals",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSource {
    pub panel: PanelId,
    pub query: ReportQuery,
    pub active_program: Option<String>,
    pub policy: PanelPolicy,
}

impl PanelSource {
    pub fn tasks(program: impl Into<String>, report: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            panel: PanelId::Tasks,
            query: ReportQuery::task_list(program.clone(), report),
            active_program: Some(program),
            policy: PanelPolicy::tasks(),
        }
    }

    pub fn intervals(program: impl Into<String>, args: Vec<String>, column: usize) -> Self {
        Self {
            panel: PanelId::Intervals,
            query: ReportQuery::intervals(program, args),
            active_program: None,
            policy: PanelPolicy::intervals(column),
        }
    }

    /// Runs one fetch/decode/reconcile cycle. `model` is only replaced once the
    /// whole cycle succeeded.
    pub fn refresh(
        &self,
        runner: &dyn CommandRunner,
        model: &mut TableModel,
    ) -> Result<Reconciliation, FetchError> {
        let active = match &self.active_program {
            Some(program) => fetch_active(runner, program).unwrap_or_else(|err| {
                warn!(panel = self.panel.label(), error = %err, "active task query failed");
                ActiveSet::default()
            }),
            None => ActiveSet::default(),
        };

        let snapshot = fetch_snapshot(runner, &self.query)?;
        let mut next = model.clone();
        let outcome = reconcile(&mut next, &snapshot, &self.policy, &active);
        *model = next;
        Ok(outcome)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    Updated {
        panel: PanelId,
        model: TableModel,
        reset: bool,
    },
    Skipped {
        panel: PanelId,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct RefreshHandle {
    panel: PanelId,
    wake: SyncSender<()>,
}

impl RefreshHandle {
    pub fn panel(&self) -> PanelId {
        self.panel
    }

    pub fn nudge(&self) {
        match self.wake.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => {
                debug!(panel = self.panel.label(), "refresh worker already stopped");
            }
        }
    }
}

pub struct RefreshWorker {
    source: PanelSource,
    runner: Arc<dyn CommandRunner>,
    interval: Duration,
    model: TableModel,
    events: Sender<RefreshEvent>,
    wake: Receiver<()>,
}

impl RefreshWorker {
    pub fn new(
        source: PanelSource,
        runner: Arc<dyn CommandRunner>,
        interval: Duration,
        model: TableModel,
        events: Sender<RefreshEvent>,
    ) -> (Self, RefreshHandle) {
        let (wake_tx, wake_rx) = mpsc::sync_channel(1);
        let handle = RefreshHandle {
            panel: source.panel,
            wake: wake_tx,
        };
        let worker = Self {
            source,
            runner,
            interval,
            model,
            events,
            wake: wake_rx,
        };
        (worker, handle)
    }

    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("refresh-{}", self.source.panel.label()))
            .spawn(move || self.run())
    }

    fn run(mut self) {
        loop {
            match self.wake.recv_timeout(self.interval) {
                Ok(()) | Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            while self.wake.try_recv().is_ok() {}

            if !self.cycle() {
                break;
            }
        }
        debug!(panel = self.source.panel.label(), "refresh worker stopped");
    }

    /// One cycle; returns false once nobody listens for events anymore.
    pub fn cycle(&mut self) -> bool {
        let panel = self.source.panel;
        let event = match self.source.refresh(self.runner.as_ref(), &mut self.model) {
            Ok(outcome) => RefreshEvent::Updated {
                panel,
                model: self.model.clone(),
                reset: outcome.reset,
            },
            Err(err) => {
                warn!(panel = panel.label(), error = %err, "refresh skipped");
                RefreshEvent::Skipped {
                    panel,
                    reason: err.to_string(),
                }
            }
        };
        self.events.send(event).is_ok()
    }
}
