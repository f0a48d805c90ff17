use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use concierge_core::{BackendStatus, Effect, Msg, Outcome, Stage, SubmissionId};
use concierge_engine::{ClientSettings, EngineEvent, EngineHandle, HealthStatus};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

const TIMER_INTERVAL: Duration = Duration::from_millis(100);
const EVENT_POLL: Duration = Duration::from_millis(50);

pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
    timers: HashMap<SubmissionId, Arc<AtomicBool>>,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings, msg_tx: mpsc::Sender<Msg>) -> Self {
        let engine = EngineHandle::new(settings);
        let runner = Self {
            engine,
            msg_tx,
            timers: HashMap::new(),
        };
        runner.spawn_event_loop();
        runner
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenStream {
                    submission,
                    request,
                } => match serde_json::to_value(&request) {
                    Ok(body) => {
                        engine_info!(
                            "OpenStream provider={} model={} seed_urls={}",
                            request.llm_provider,
                            request.llm_model,
                            request.seed_urls.len()
                        );
                        self.engine.submit(submission, body);
                    }
                    Err(err) => {
                        engine_error!("Failed to encode request: {}", err);
                        let _ = self.msg_tx.send(Msg::Completed {
                            submission,
                            outcome: Outcome::Failed {
                                message: format!("could not encode request: {err}"),
                            },
                        });
                    }
                },
                Effect::StartTimer { submission } => self.start_timer(submission),
                Effect::StopTimer { submission } => self.stop_timer(submission),
                Effect::CancelSubmission { submission } => {
                    engine_info!("CancelSubmission {}", submission);
                    self.engine.cancel(submission);
                }
                Effect::CheckHealth => self.engine.check_health(),
            }
        }
    }

    fn start_timer(&mut self, submission: SubmissionId) {
        let stop = Arc::new(AtomicBool::new(false));
        if let Some(previous) = self.timers.insert(submission, stop.clone()) {
            previous.store(true, Ordering::Relaxed);
        }
        let msg_tx = self.msg_tx.clone();
        let started = Instant::now();
        thread::spawn(move || loop {
            thread::sleep(TIMER_INTERVAL);
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let tick = Msg::TimerTick {
                submission,
                elapsed: started.elapsed(),
            };
            if msg_tx.send(tick).is_err() {
                break;
            }
        });
    }

    fn stop_timer(&mut self, submission: SubmissionId) {
        match self.timers.remove(&submission) {
            Some(stop) => stop.store(true, Ordering::Relaxed),
            None => engine_debug!("no timer running for submission {}", submission),
        }
    }

    fn spawn_event_loop(&self) {
        let engine = self.engine.clone();
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.recv_timeout(EVENT_POLL) {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            }
        });
    }
}

impl Drop for EffectRunner {
    fn drop(&mut self) {
        for stop in self.timers.values() {
            stop.store(true, Ordering::Relaxed);
        }
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Stage { submission, update } => Msg::StageReached {
            submission,
            stage: Stage::from_server_name(&update.name),
            label: update.label,
            active_agents: update.active_agents,
        },
        EngineEvent::Completed { submission, result } => Msg::Completed {
            submission,
            outcome: match result {
                Ok(completion) => {
                    if completion.via_fallback {
                        engine_info!("Submission {} answered by the fallback endpoint", submission);
                    }
                    Outcome::Success {
                        payload: completion.payload,
                        via_fallback: completion.via_fallback,
                    }
                }
                Err(err) => {
                    engine_warn!("Submission {} failed: {}", submission, err);
                    Outcome::Failed {
                        message: err.user_message(),
                    }
                }
            },
        },
        EngineEvent::Health(result) => Msg::HealthReported(backend_status(result)),
    }
}

fn backend_status(result: Result<HealthStatus, concierge_engine::ClientError>) -> BackendStatus {
    match result {
        Ok(status) => BackendStatus {
            healthy: status.ok,
            summary: status.summary(),
        },
        Err(err) => BackendStatus {
            healthy: false,
            summary: format!("backend unreachable ({err})"),
        },
    }
}
