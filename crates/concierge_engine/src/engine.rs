use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, with_submission};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::fallback::submit_with_fallback;
use crate::health::check_health;
use crate::stream::{ChatTransport, ProgressSink, ReqwestTransport};
use crate::{ClientSettings, EngineEvent, StageUpdate, SubmissionId};

enum EngineCommand {
    Submit {
        submission: SubmissionId,
        body: Value,
    },
    Cancel {
        submission: SubmissionId,
    },
    CheckHealth,
}

/// Forwards stage notifications of one submission to the engine's channel.
pub struct ChannelProgressSink {
    submission: SubmissionId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(submission: SubmissionId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { submission, tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn stage(&self, update: StageUpdate) {
        let _ = self.tx.send(EngineEvent::Stage {
            submission: self.submission,
            update,
        });
    }
}

/// Owns the IO runtime. Commands go in from the UI thread, events come back
/// through [`EngineHandle::try_recv`] or [`EngineHandle::recv_timeout`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Self {
        let transport = Arc::new(ReqwestTransport::new(settings.clone()));
        Self::with_transport(transport, settings)
    }

    /// Runs submissions through `transport`; `settings` is still used for
    /// health checks.
    pub fn with_transport(transport: Arc<dyn ChatTransport>, settings: ClientSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut running: HashMap<SubmissionId, CancellationToken> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                // Finished tasks cancel their own token on the way out.
                running.retain(|_, token| !token.is_cancelled());
                match command {
                    EngineCommand::Submit { submission, body } => {
                        let token = CancellationToken::new();
                        running.insert(submission, token.clone());
                        let transport = transport.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(with_submission(submission, async move {
                            run_submission(transport.as_ref(), submission, body, token, event_tx)
                                .await;
                        }));
                    }
                    EngineCommand::Cancel { submission } => match running.remove(&submission) {
                        Some(token) => {
                            engine_info!("cancelling submission {}", submission);
                            token.cancel();
                        }
                        None => engine_debug!("submission {} already finished", submission),
                    },
                    EngineCommand::CheckHealth => {
                        let settings = settings.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = check_health(&settings).await;
                            let _ = event_tx.send(EngineEvent::Health(result));
                        });
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    /// Starts a submission. `body` is posted verbatim.
    pub fn submit(&self, submission: SubmissionId, body: Value) {
        let _ = self.cmd_tx.send(EngineCommand::Submit { submission, body });
    }

    /// Stops a running submission. It will not report a completion.
    pub fn cancel(&self, submission: SubmissionId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { submission });
    }

    pub fn check_health(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CheckHealth);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

async fn run_submission(
    transport: &dyn ChatTransport,
    submission: SubmissionId,
    body: Value,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let _finished = token.clone().drop_guard();
    let sink = ChannelProgressSink::new(submission, event_tx.clone());
    match token
        .run_until_cancelled(submit_with_fallback(transport, &body, &sink))
        .await
    {
        Some(result) => {
            if let Err(err) = &result {
                engine_info!("submission failed: {}", err);
            }
            let _ = event_tx.send(EngineEvent::Completed { submission, result });
        }
        None => engine_info!("submission cancelled before completion"),
    }
}
