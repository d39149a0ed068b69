// SPDX-License-Identifier: MIT OR Apache-2.0
//! The "Ungroup All Objects" operator.
//!
//! `execute` sizes the batch and registers a recurring timer; every timer
//! event delivered to `modal` reports progress and processes one object.
//! Other events pass through so the host stays responsive.

use crate::batch::{MaterialBatch, TickResult};
use crate::scene::Scene;
use crate::settings::UngrouperSettings;
use crate::uv_fix::fix_uv_maps;
use indexmap::IndexMap;
use std::sync::mpsc;
use std::time::Duration;
use ungrouper_graph::rewrite::UngroupOptions;
use ungrouper_graph::{EditorContext, UngroupTransform, Ungrouper};

/// Operator identifier
pub const OPERATOR_ID: &str = "object.ungroup_scene_modal";

/// Operator label shown on buttons
pub const OPERATOR_LABEL: &str = "Ungroup All Objects";

/// Errors surfaced to the user when starting the operator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperatorError {
    /// The operator needs a window to attach its timer to
    #[error("No window available")]
    NoWindow,
}

/// Result of running an operator step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorResult {
    /// Keep receiving modal events
    RunningModal,
    /// Done
    Finished,
    /// Event not consumed
    PassThrough,
}

/// Identifier of a registered timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Events delivered to a running modal operator
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A registered timer fired
    Timer(TimerId),
    /// Pointer moved
    MouseMove {
        /// Horizontal position
        x: f32,
        /// Vertical position
        y: f32,
    },
    /// Key pressed
    Key(String),
}

/// Recurring timers owned by the host window
#[derive(Debug, Default)]
pub struct TimerRegistry {
    next_id: u64,
    timers: IndexMap<TimerId, Duration>,
}

impl TimerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a timer firing every `interval`
    pub fn add(&mut self, interval: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.insert(id, interval);
        id
    }

    /// Remove a timer, returning whether it existed
    pub fn remove(&mut self, id: TimerId) -> bool {
        self.timers.shift_remove(&id).is_some()
    }

    /// Interval of a registered timer
    pub fn interval(&self, id: TimerId) -> Option<Duration> {
        self.timers.get(&id).copied()
    }

    /// Registered timers in registration order
    pub fn active(&self) -> impl Iterator<Item = TimerId> + '_ {
        self.timers.keys().copied()
    }

    /// Whether no timer is registered
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

/// Severity of a status report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    /// Progress and results
    Info,
    /// Recoverable problems
    Warning,
    /// Failures
    Error,
}

/// A line for the host's status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Severity
    pub level: StatusLevel,
    /// Text
    pub message: String,
}

/// Sending half of the status channel
#[derive(Debug, Clone)]
pub struct StatusSender {
    sender: mpsc::Sender<StatusReport>,
}

impl StatusSender {
    /// Send a report; a closed channel drops it
    pub fn report(&self, level: StatusLevel, message: impl Into<String>) {
        let _ = self.sender.send(StatusReport {
            level,
            message: message.into(),
        });
    }
}

/// Receiving half of the status channel
#[derive(Debug)]
pub struct StatusChannel {
    receiver: mpsc::Receiver<StatusReport>,
}

impl StatusChannel {
    /// Create a channel and return `(channel, sender)`
    pub fn new() -> (Self, StatusSender) {
        let (sender, receiver) = mpsc::channel();
        (Self { receiver }, StatusSender { sender })
    }

    /// Drain pending reports
    pub fn drain(&self) -> Vec<StatusReport> {
        let mut reports = Vec::new();
        while let Ok(report) = self.receiver.try_recv() {
            reports.push(report);
        }
        reports
    }
}

/// Modal operator flattening the materials of a scene
pub struct UngroupSceneOperator<T> {
    ungrouper: Ungrouper<T>,
    settings: UngrouperSettings,
    status: StatusSender,
    batch: Option<MaterialBatch>,
    timer: Option<TimerId>,
}

impl<T: UngroupTransform> UngroupSceneOperator<T> {
    /// Create the operator around an ungroup transform
    pub fn new(transform: T, settings: UngrouperSettings, status: StatusSender) -> Self {
        let ungrouper = Ungrouper::new(transform).with_options(UngroupOptions {
            max_passes: settings.max_passes,
        });
        Self {
            ungrouper,
            settings,
            status,
            batch: None,
            timer: None,
        }
    }

    /// Start the batch.
    ///
    /// Fails only when there is no window to attach the timer to.
    pub fn execute(
        &mut self,
        scene: &mut Scene,
        context: &EditorContext,
        timers: &mut TimerRegistry,
    ) -> Result<OperatorResult, OperatorError> {
        if context.window.is_none() {
            self.status.report(StatusLevel::Error, "No window available");
            return Err(OperatorError::NoWindow);
        }

        if self.settings.fix_uv_maps {
            let fixed = fix_uv_maps(scene);
            if fixed > 0 {
                tracing::info!("Reassigned {} UV map node(s)", fixed);
            }
        }

        let batch = MaterialBatch::new(scene, self.settings.object_scope);
        tracing::info!(
            "Ungrouping {} material(s) on {:?} objects",
            batch.total_materials(),
            self.settings.object_scope
        );
        self.batch = Some(batch);

        if let Some(old) = self.timer.take() {
            timers.remove(old);
        }
        self.timer = Some(timers.add(Duration::from_millis(self.settings.timer_interval_ms)));
        Ok(OperatorResult::RunningModal)
    }

    /// Handle an event while running
    pub fn modal(
        &mut self,
        event: &HostEvent,
        scene: &mut Scene,
        context: &mut EditorContext,
        timers: &mut TimerRegistry,
    ) -> OperatorResult {
        let HostEvent::Timer(id) = event else {
            return OperatorResult::PassThrough;
        };
        if self.timer != Some(*id) {
            return OperatorResult::PassThrough;
        }
        let Some(batch) = self.batch.as_mut() else {
            self.finish(timers);
            return OperatorResult::Finished;
        };

        self.status.report(StatusLevel::Info, batch.progress_text());
        match batch.tick(scene, context, &mut self.ungrouper) {
            TickResult::Continue => OperatorResult::RunningModal,
            TickResult::Finished => {
                let summary = batch.summary().clone();
                self.status.report(StatusLevel::Info, batch.progress_text());
                if summary.failed > 0 || summary.aborted_materials > 0 {
                    self.status.report(
                        StatusLevel::Warning,
                        format!(
                            "{} group node(s) could not be ungrouped, see the log",
                            summary.failed + summary.aborted_materials
                        ),
                    );
                }
                tracing::info!(
                    "Ungrouped {} group node(s), {} placeholder(s), {} reroute(s) removed",
                    summary.ungrouped,
                    summary.placeholders,
                    summary.reroutes_removed
                );
                self.finish(timers);
                OperatorResult::Finished
            }
        }
    }

    /// Remove the timer
    pub fn finish(&mut self, timers: &mut TimerRegistry) {
        if let Some(id) = self.timer.take() {
            timers.remove(id);
        }
    }

    /// Timer driving the batch, if running
    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Current batch
    pub fn batch(&self) -> Option<&MaterialBatch> {
        self.batch.as_ref()
    }
}
