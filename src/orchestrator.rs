// single-flight submission lifecycle
// transition() is pure, RequestOrchestrator carries out its effects on tokio

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::client::PlanningService;
use crate::error::{PlanningError, ValidationError};
use crate::interpreter::{self, Section};
use crate::models::{Configuration, SubmissionResult};
use crate::store::{ConfigurationStore, Field, Snapshot, ValidationOutcome};

// identity of one accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    Submitting(RequestId),
    Succeeded(SubmissionResult),
    Failed(String),
}

impl Phase {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Phase::Submitting(_))
    }
}

// things the user gets told about
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Invalid(ValidationError),
    Failed(String),
    Cancelled,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Invalid(err) => write!(f, "{}", err),
            Notice::Failed(message) => write!(f, "Error: {}", message),
            Notice::Cancelled => f.write_str("Submission cancelled"),
        }
    }
}

#[derive(Debug)]
pub enum Event {
    Edit { field: Field, raw: String },
    Submit,
    Cancel,
    Completed {
        request: RequestId,
        outcome: Result<SubmissionResult, PlanningError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Dispatch { request: RequestId, snapshot: Snapshot },
    Abort(RequestId),
    Notify(Notice),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub store: ConfigurationStore,
    pub phase: Phase,
    next_request: u64,
}

impl AppState {
    pub fn new(config: Configuration) -> Self {
        Self {
            store: ConfigurationStore::new(config),
            ..Default::default()
        }
    }

    pub fn config(&self) -> &Configuration {
        self.store.config()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        match self.phase {
            Phase::Submitting(request) => Some(request),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&SubmissionResult> {
        match &self.phase {
            Phase::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    // what the results view shows right now
    pub fn sections(&self) -> Vec<Section> {
        self.result().map(interpreter::interpret).unwrap_or_default()
    }
}

pub fn transition(mut state: AppState, event: Event) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();

    match event {
        Event::Edit { field, raw } => {
            // edits while submitting only affect the next submission
            state.store.update_field(field, &raw);
        }

        Event::Submit => {
            if let Some(request) = state.in_flight() {
                debug!("Ignoring submit, request {} still in flight", request);
                return (state, effects);
            }

            match state.store.validate() {
                ValidationOutcome::Invalid(fields) => {
                    let err = ValidationError { fields };
                    info!("Submission blocked: {}", err);
                    effects.push(Effect::Notify(Notice::Invalid(err)));
                }
                ValidationOutcome::Valid => {
                    state.next_request += 1;
                    let request = RequestId(state.next_request);
                    info!("Submitting request {}", request);

                    // previous result is gone as soon as a new request starts
                    state.phase = Phase::Submitting(request);
                    effects.push(Effect::Dispatch {
                        request,
                        snapshot: state.store.snapshot(),
                    });
                }
            }
        }

        Event::Cancel => {
            if let Some(request) = state.in_flight() {
                info!("Cancelling request {}", request);
                state.phase = Phase::Idle;
                effects.push(Effect::Abort(request));
                effects.push(Effect::Notify(Notice::Cancelled));
            }
        }

        Event::Completed { request, outcome } => {
            if state.in_flight() != Some(request) {
                debug!("Discarding stale response for request {}", request);
                return (state, effects);
            }

            state.phase = match outcome {
                Ok(result) if result.success => {
                    info!("Request {} succeeded: {}", request, result.message);
                    Phase::Succeeded(result)
                }
                Ok(result) => {
                    warn!("Request {} reported failure: {}", request, result.message);
                    effects.push(Effect::Notify(Notice::Failed(result.message.clone())));
                    Phase::Failed(result.message)
                }
                Err(err) => {
                    let message = err.user_message();
                    warn!("Request {} failed: {}", request, message);
                    effects.push(Effect::Notify(Notice::Failed(message.clone())));
                    Phase::Failed(message)
                }
            };
        }
    }

    (state, effects)
}

struct Completion {
    request: RequestId,
    outcome: Result<SubmissionResult, PlanningError>,
}

enum Wake {
    Completed(Completion),
    Joined(RequestId, Result<(), JoinError>),
}

// a task that died without reporting back
fn task_failure(err: &JoinError) -> PlanningError {
    if err.is_panic() {
        warn!("Planning request task panicked");
        PlanningError::Transport("Planning request crashed".to_string())
    } else {
        PlanningError::Transport("Planning request was aborted".to_string())
    }
}

// submit() spawns onto the current tokio runtime, only the network call leaves this task
pub struct RequestOrchestrator<S> {
    service: Arc<S>,
    state: AppState,
    timeout: Option<Duration>,
    in_flight: Option<(RequestId, JoinHandle<()>)>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    notices: Vec<Notice>,
}

impl<S: PlanningService> RequestOrchestrator<S> {
    pub fn new(service: S) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            service: Arc::new(service),
            state: AppState::default(),
            timeout: None,
            in_flight: None,
            completions_tx,
            completions_rx,
            notices: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_config(mut self, config: Configuration) -> Self {
        self.state = AppState::new(config);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn phase(&self) -> &Phase {
        &self.state.phase
    }

    pub fn update_field(&mut self, field: Field, raw: impl Into<String>) -> &Configuration {
        self.dispatch(Event::Edit {
            field,
            raw: raw.into(),
        });
        self.state.config()
    }

    // None if rejected or another request is still running
    pub fn submit(&mut self) -> Option<RequestId> {
        let before = self.state.in_flight();
        self.dispatch(Event::Submit);
        let after = self.state.in_flight();
        if after != before {
            after
        } else {
            None
        }
    }

    pub fn cancel(&mut self) -> bool {
        let was_submitting = self.state.phase.is_submitting();
        self.dispatch(Event::Cancel);
        was_submitting
    }

    // wait until the in-flight request (if any) has been resolved
    pub async fn settle(&mut self) -> &Phase {
        while self.state.phase.is_submitting() {
            let wake = match self.in_flight.as_mut() {
                Some((request, task)) => {
                    let request = *request;
                    tokio::select! {
                        done = self.completions_rx.recv() => done.map(Wake::Completed),
                        joined = task => Some(Wake::Joined(request, joined)),
                    }
                }
                None => self.completions_rx.recv().await.map(Wake::Completed),
            };

            match wake {
                Some(Wake::Completed(done)) => self.dispatch(Event::Completed {
                    request: done.request,
                    outcome: done.outcome,
                }),
                // the completion was sent before the task returned
                Some(Wake::Joined(_, Ok(()))) => self.in_flight = None,
                Some(Wake::Joined(request, Err(err))) => {
                    self.in_flight = None;
                    self.dispatch(Event::Completed {
                        request,
                        outcome: Err(task_failure(&err)),
                    });
                }
                None => break,
            }
        }
        &self.state.phase
    }

    // apply any responses that already arrived, without waiting
    pub fn poll(&mut self) -> &Phase {
        while let Ok(done) = self.completions_rx.try_recv() {
            self.dispatch(Event::Completed {
                request: done.request,
                outcome: done.outcome,
            });
        }
        &self.state.phase
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn dispatch(&mut self, event: Event) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = transition(state, event);
        self.state = state;

        for effect in effects {
            self.perform(effect);
        }

        if let Some((request, _)) = &self.in_flight {
            if self.state.in_flight() != Some(*request) {
                self.in_flight = None;
            }
        }
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::Dispatch { request, snapshot } => self.spawn_request(request, snapshot),
            Effect::Abort(request) => {
                if let Some((current, handle)) = self.in_flight.take() {
                    if current == request {
                        handle.abort();
                    } else {
                        self.in_flight = Some((current, handle));
                    }
                }
            }
            Effect::Notify(notice) => {
                info!("{}", notice);
                self.notices.push(notice);
            }
        }
    }

    fn spawn_request(&mut self, request: RequestId, snapshot: Snapshot) {
        let service = Arc::clone(&self.service);
        let completions = self.completions_tx.clone();
        let timeout = self.timeout;

        let task = tokio::spawn(async move {
            let call = service.run_event(&snapshot);
            let outcome = match timeout {
                Some(limit) => tokio::time::timeout(limit, call)
                    .await
                    .unwrap_or(Err(PlanningError::Timeout(limit))),
                None => call.await,
            };

            if completions.send(Completion { request, outcome }).is_err() {
                debug!("Orchestrator gone, dropping response for request {}", request);
            }
        });

        self.in_flight = Some((request, task));
    }
}

impl<S> Drop for RequestOrchestrator<S> {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.in_flight.take() {
            handle.abort();
        }
    }
}
