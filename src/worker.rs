//! Runs service calls off the UI thread.
//!
//! Each [`Request`] is a whole operation script (a mutation followed by its
//! refresh, for example), so the steps of one operation always run in order
//! and the UI only ever sees the finished [`Outcome`].

use crate::config::AppConfig;
use crate::errors::AppResult;
use crate::model::{MirrorView, Mutation, Snapshot, TraversalKind, TreeInfo, TreeKind};
use crate::service::{HttpTreeService, ServiceError, TreeService};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

pub type Ticket = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Refresh { with_info: bool },
    Mutate(Mutation),
    ShowMirror,
    Restore,
    Traversal(TraversalKind),
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub ticket: Ticket,
    pub tree_type: TreeKind,
    pub job: Job,
}

#[derive(Debug)]
pub struct Refresh {
    pub structure: Result<Option<Snapshot>, ServiceError>,
    pub info: Option<Result<TreeInfo, ServiceError>>,
}

#[derive(Debug)]
pub enum JobResult {
    Refreshed(Refresh),
    Mutated {
        mutation: Mutation,
        message: Result<String, ServiceError>,
        /// Absent when the mutation itself failed in transport.
        refresh: Option<Refresh>,
    },
    Mirrored(Result<MirrorView, ServiceError>),
    Restored(Refresh),
    Traversal {
        traversal: TraversalKind,
        values: Result<Vec<i64>, ServiceError>,
    },
    Info(Result<TreeInfo, ServiceError>),
}

#[derive(Debug)]
pub struct Outcome {
    pub ticket: Ticket,
    pub result: JobResult,
}

fn refresh(service: &dyn TreeService, kind: TreeKind, with_info: bool) -> Refresh {
    Refresh {
        structure: service.structure(kind),
        info: with_info.then(|| service.info(kind)),
    }
}

/// Executes one request to completion on the calling thread.
pub fn perform(service: &dyn TreeService, request: Request) -> Outcome {
    let kind = request.tree_type;
    let result = match request.job {
        Job::Refresh { with_info } => JobResult::Refreshed(refresh(service, kind, with_info)),
        Job::Mutate(mutation) => {
            let message = service.mutate(kind, mutation);
            let refresh = message.is_ok().then(|| refresh(service, kind, true));
            JobResult::Mutated {
                mutation,
                message,
                refresh,
            }
        }
        Job::ShowMirror => JobResult::Mirrored(service.mirror()),
        Job::Restore => JobResult::Restored(refresh(service, kind, false)),
        Job::Traversal(traversal) => JobResult::Traversal {
            traversal,
            values: service.traversal(kind, traversal),
        },
        Job::Info => JobResult::Info(service.info(kind)),
    };

    Outcome {
        ticket: request.ticket,
        result,
    }
}

/// A background thread owning the tree service. Requests run in FIFO order.
pub struct ServiceWorker {
    requests: Option<Sender<Request>>,
    outcomes: Receiver<Outcome>,
    handle: Option<JoinHandle<()>>,
}

impl ServiceWorker {
    /// Starts a worker talking HTTP to the configured server.
    pub fn connect(config: &AppConfig) -> AppResult<Self> {
        let service = HttpTreeService::new(&config.server_url, config.request_timeout())?;
        tracing::info!(url = service.base_url(), "connecting to tree service");
        Ok(Self::spawn(service)?)
    }

    pub fn spawn<S: TreeService + 'static>(service: S) -> std::io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<Request>();
        let (outcome_tx, outcome_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("tree-service".into())
            .spawn(move || {
                for request in request_rx {
                    tracing::debug!(ticket = request.ticket, job = ?request.job, "request started");
                    let outcome = perform(&service, request);
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
                tracing::debug!("request worker stopped");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            outcomes: outcome_rx,
            handle: Some(handle),
        })
    }

    pub fn submit(&self, request: Request) -> Result<(), ServiceError> {
        self.requests
            .as_ref()
            .ok_or(ServiceError::Disconnected)?
            .send(request)
            .map_err(|_| ServiceError::Disconnected)
    }

    /// Next finished outcome, if any, without blocking.
    pub fn poll(&self) -> Result<Option<Outcome>, ServiceError> {
        match self.outcomes.try_recv() {
            Ok(outcome) => Ok(Some(outcome)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ServiceError::Disconnected),
        }
    }

    /// Blocks until the next outcome arrives.
    pub fn recv(&self) -> Result<Outcome, ServiceError> {
        self.outcomes.recv().map_err(|_| ServiceError::Disconnected)
    }
}

impl Drop for ServiceWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop once the
        // in-flight request finishes. A request still hanging is left behind
        // rather than blocking shutdown.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                tracing::debug!("request worker still busy, detaching");
            } else if handle.join().is_err() {
                tracing::error!("request worker panicked");
            }
        }
    }
}
