use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use batch_core::{Credentials, JobId};
use batch_logging::{batch_debug, batch_error, batch_info};
use tokio::sync::mpsc as command_channel;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::call::RemoteCaller;
use crate::EngineEvent;

enum EngineCommand {
    Schedule {
        job_id: JobId,
        targets: Vec<String>,
        stagger: Duration,
        credentials: Credentials,
    },
    Cancel {
        job_id: JobId,
    },
}

/// Owns the engine thread. Dropping the handle closes the command channel,
/// which stops the runtime and abandons whatever is still pending.
pub struct EngineHandle {
    cmd_tx: command_channel::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(caller: Arc<dyn RemoteCaller>) -> Self {
        let (cmd_tx, cmd_rx) = command_channel::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    batch_error!("engine runtime failed to start: {}", err);
                    let _ = event_tx.send(EngineEvent::EngineFailed {
                        message: err.to_string(),
                    });
                    return;
                }
            };
            runtime.block_on(Scheduler::new(caller, event_tx).run(cmd_rx));
        });

        Self { cmd_tx, event_rx }
    }

    pub fn schedule(
        &self,
        job_id: JobId,
        targets: Vec<String>,
        stagger: Duration,
        credentials: Credentials,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::Schedule {
            job_id,
            targets,
            stagger,
            credentials,
        });
    }

    pub fn cancel(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { job_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

struct PendingCall {
    index: usize,
    target: String,
    token: CancellationToken,
    fired: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

struct ScheduledJob {
    job_id: JobId,
    total: usize,
    /// Fired calls already pruned from `calls`.
    pruned_fired: usize,
    calls: Vec<PendingCall>,
}

impl ScheduledJob {
    fn fired(&self) -> usize {
        let live = self
            .calls
            .iter()
            .filter(|call| call.fired.load(Ordering::SeqCst))
            .count();
        self.pruned_fired + live
    }

    fn prune_finished(&mut self) {
        let mut pruned_fired = 0;
        self.calls.retain(|call| {
            if !call.task.is_finished() {
                return true;
            }
            if call.fired.load(Ordering::SeqCst) {
                pruned_fired += 1;
            }
            false
        });
        self.pruned_fired += pruned_fired;
    }

    /// Cancels every call that has not fired yet and returns how many were
    /// suppressed. Runs on the engine thread, so no task can fire midway.
    fn suppress_unfired(&self) -> usize {
        let mut suppressed = 0;
        for call in &self.calls {
            if !call.fired.load(Ordering::SeqCst) {
                call.token.cancel();
                suppressed += 1;
                batch_debug!(
                    "job {} call {} suppressed ({})",
                    self.job_id,
                    call.index,
                    call.target
                );
            }
        }
        suppressed
    }
}

struct Scheduler {
    caller: Arc<dyn RemoteCaller>,
    event_tx: mpsc::Sender<EngineEvent>,
    current: Option<ScheduledJob>,
}

impl Scheduler {
    fn new(caller: Arc<dyn RemoteCaller>, event_tx: mpsc::Sender<EngineEvent>) -> Self {
        Self {
            caller,
            event_tx,
            current: None,
        }
    }

    async fn run(mut self, mut cmd_rx: command_channel::UnboundedReceiver<EngineCommand>) {
        while let Some(command) = cmd_rx.recv().await {
            self.prune_settled();
            match command {
                EngineCommand::Schedule {
                    job_id,
                    targets,
                    stagger,
                    credentials,
                } => self.schedule(job_id, targets, stagger, credentials),
                EngineCommand::Cancel { job_id } => self.cancel(job_id),
            }
        }
        batch_debug!("engine command channel closed");
    }

    fn prune_settled(&mut self) {
        if let Some(job) = self.current.as_mut() {
            job.prune_finished();
        }
    }

    fn schedule(
        &mut self,
        job_id: JobId,
        targets: Vec<String>,
        stagger: Duration,
        credentials: Credentials,
    ) {
        if let Some(previous) = self.current.take() {
            let suppressed = previous.suppress_unfired();
            if suppressed > 0 {
                batch_info!(
                    "job {} superseded by job {}; {} calls suppressed",
                    previous.job_id,
                    job_id,
                    suppressed
                );
            }
        }

        let start = Instant::now();
        let credentials = Arc::new(credentials);
        let total = targets.len();
        batch_info!(
            "job {} scheduled: {} targets, stagger {:?}",
            job_id,
            total,
            stagger
        );

        let calls = targets
            .into_iter()
            .enumerate()
            .map(|(index, target)| {
                let token = CancellationToken::new();
                let fired = Arc::new(AtomicBool::new(false));
                let offset = stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
                let task = tokio::spawn(run_call(
                    CallTask {
                        job_id,
                        index,
                        target: target.clone(),
                        due: start + offset,
                        start,
                        token: token.clone(),
                        fired: fired.clone(),
                        credentials: credentials.clone(),
                    },
                    self.caller.clone(),
                    self.event_tx.clone(),
                ));
                PendingCall {
                    index,
                    target,
                    token,
                    fired,
                    task,
                }
            })
            .collect();

        self.current = Some(ScheduledJob {
            job_id,
            total,
            pruned_fired: 0,
            calls,
        });
    }

    fn cancel(&mut self, job_id: JobId) {
        let (fired, suppressed) = match self.current.as_ref() {
            Some(job) if job.job_id == job_id => {
                job.suppress_unfired();
                // A cancelled token never fires, so repeated cancels agree.
                let fired = job.fired();
                (fired, job.total - fired)
            }
            _ => (0, 0),
        };
        batch_info!(
            "job {} cancelled: {} fired, {} suppressed",
            job_id,
            fired,
            suppressed
        );
        let _ = self.event_tx.send(EngineEvent::JobCancelled {
            job_id,
            fired,
            suppressed,
        });
    }
}

struct CallTask {
    job_id: JobId,
    index: usize,
    target: String,
    due: Instant,
    start: Instant,
    token: CancellationToken,
    fired: Arc<AtomicBool>,
    credentials: Arc<Credentials>,
}

async fn run_call(
    task: CallTask,
    caller: Arc<dyn RemoteCaller>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    tokio::select! {
        biased;
        _ = task.token.cancelled() => return,
        _ = tokio::time::sleep_until(task.due) => {}
    }

    task.fired.store(true, Ordering::SeqCst);
    let _ = event_tx.send(EngineEvent::CallDispatched {
        job_id: task.job_id,
        index: task.index,
        after: task.start.elapsed(),
    });

    let outcome = caller.call(&task.target, &task.credentials).await;
    let _ = event_tx.send(EngineEvent::CallSettled {
        job_id: task.job_id,
        index: task.index,
        outcome,
    });
}
