//! SyncProxy - offline-capable front for the question bank.
//!
//! # Architecture
//!
//! The proxy drives the pure [`SearchMachine`] from quiz-core and
//! interprets its actions against the server, the overlay cache and the
//! pending queue.
//!
//! ```text
//! Application → SyncProxy → QuizServer → Network
//!                   ↓     ↘
//!        SearchMachine     OverlayCache → QuestionStore
//!                          PendingQueue → queue file
//! ```
//!
//! Every request ends with exactly one terminal [`Notification`], which is
//! both returned and sent on the channel handed out by [`SyncProxy::new`].
//! The machine is committed only after the last await of a request, so a
//! dropped request future leaves the search state untouched.

use std::sync::Arc;

use quiz_core::{
    ProxyState, QueryCompiler, ResponseClass, SearchAction, SearchEvent, SearchMachine,
};
use quiz_store::{OverlayCache, OverlayStats, QuestionStore, StorageError};
use quiz_types::{
    CorrelationId, OutboundRequest, PendingSubmission, Question, SearchPage, SearchQuery,
    SearchRequest,
};
use tokio::sync::mpsc;

use crate::connectivity::Connectivity;
use crate::events::{FailureKind, Notification};
use crate::queue::{PendingQueue, QueueError};
use crate::server::{QuizServer, SessionCredential};

/// Endpoint returning one random question.
pub const RANDOM_PATH: &str = "/quizquestions/random";
/// Endpoint returning one page of search results.
pub const SEARCH_PATH: &str = "/search";
/// Endpoint accepting new questions.
pub const SUBMIT_PATH: &str = "/quizquestions/";

/// Result of one queue drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Submissions the server accepted.
    pub delivered: usize,
    /// Submissions the server refused (dropped for good).
    pub rejected: usize,
    /// Submissions still queued afterwards.
    pub remaining: usize,
    /// True if the drain stopped before the queue emptied.
    pub halted: bool,
}

/// Snapshot of proxy state for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyStatus {
    /// Search protocol state.
    pub state: ProxyState,
    /// Submissions awaiting delivery.
    pub queued: usize,
    /// Questions in the relational store.
    pub stored: u64,
    /// Overlay occupancy.
    pub overlay: OverlayStats,
    /// Search results buffered for delivery.
    pub buffered: usize,
}

/// How one server exchange ended.
enum Exchange {
    Success(String),
    Rejected(u16),
    Unreachable,
}

/// How one delivery attempt of a submission ended.
enum Delivery {
    Accepted(Question),
    Rejected(FailureKind),
    Unreachable,
}

/// What executing one machine action produced.
enum Step {
    Feed(SearchEvent),
    Done(Notification),
    Unreachable,
}

/// Offline-capable sync proxy.
///
/// Request methods take `&mut self`: one logical request is in flight at a
/// time.
pub struct SyncProxy<S, C, St> {
    server: S,
    connectivity: C,
    cache: Arc<OverlayCache<St>>,
    queue: PendingQueue,
    machine: SearchMachine,
    credential: Option<SessionCredential>,
    events: mpsc::UnboundedSender<Notification>,
}

impl<S, C, St> SyncProxy<S, C, St>
where
    S: QuizServer,
    C: Connectivity,
    St: QuestionStore,
{
    /// Create a proxy and the receiver for its notifications.
    pub fn new(
        server: S,
        connectivity: C,
        cache: Arc<OverlayCache<St>>,
        queue: PendingQueue,
    ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let proxy = Self {
            server,
            connectivity,
            cache,
            queue,
            machine: SearchMachine::new(),
            credential: None,
            events,
        };
        (proxy, receiver)
    }

    /// Attach `credential` to every outbound request.
    pub fn with_credential(mut self, credential: SessionCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Start a new search, replacing any active one.
    pub fn set_query(&mut self, query: SearchQuery) {
        tracing::debug!(query = %query.text, "search query set");
        self.transition(SearchEvent::QueryChanged(query));
    }

    /// Drop the active search and return to random questions.
    pub fn clear_query(&mut self) {
        self.transition(SearchEvent::Reset);
    }

    /// Produce the next question.
    ///
    /// Online requests go to the server; connectivity failures fall back to
    /// the local cache within the same call.
    pub async fn get_question(&mut self) -> Notification {
        let mut machine = self.machine.clone();
        let mut online = self.connectivity.is_online();
        let mut failure = None;
        let mut event = SearchEvent::QuestionRequested { online };

        let outcome = loop {
            let from = machine.state();
            let (next, actions) = machine.on_event(event);
            machine = next;
            if from != machine.state() {
                tracing::debug!(%from, to = %machine.state(), "search state changed");
            }

            let Some(action) = actions.into_iter().next() else {
                break Notification::NothingAvailable(FailureKind::NotFound);
            };
            match self.execute(action, &mut failure).await {
                Step::Feed(e) => event = e,
                Step::Done(notification) => break notification,
                Step::Unreachable if online => {
                    self.go_offline();
                    online = false;
                    event = SearchEvent::QuestionRequested { online };
                }
                Step::Unreachable => {
                    break Notification::NothingAvailable(FailureKind::Connectivity);
                }
            }
        };

        self.machine = machine;
        self.emit(outcome.clone());
        outcome
    }

    /// Submit a new question.
    ///
    /// Invalid questions are rejected before anything is sent or queued.
    /// Offline, or when the server proves unreachable, the request is
    /// queued and reported as accepted (deferred).
    pub async fn submit(&mut self, question: Question) -> Notification {
        let outcome = self.submit_inner(question).await;
        self.emit(outcome.clone());
        outcome
    }

    async fn submit_inner(&mut self, question: Question) -> Notification {
        if let Err(e) = question.validate() {
            tracing::debug!(error = %e, "submission rejected locally");
            return Notification::SubmissionRejected {
                correlation: CorrelationId::new(),
                kind: FailureKind::Validation(e),
            };
        }

        let request = match OutboundRequest::post_json(SUBMIT_PATH, &question) {
            Ok(request) => self.authorize(request),
            Err(e) => {
                return Notification::SubmissionRejected {
                    correlation: CorrelationId::new(),
                    kind: FailureKind::Storage(e.to_string()),
                }
            }
        };
        let pending = PendingSubmission::new(request);
        let correlation = pending.correlation;

        if self.connectivity.is_online() {
            match self.deliver(&pending).await {
                Delivery::Accepted(stored) => {
                    return Notification::SubmissionAccepted {
                        correlation,
                        question: stored,
                        deferred: false,
                    }
                }
                Delivery::Rejected(kind) => {
                    return Notification::SubmissionRejected { correlation, kind }
                }
                Delivery::Unreachable => self.go_offline(),
            }
        }

        match self.queue.enqueue(pending) {
            Ok(()) => {
                tracing::debug!(%correlation, queued = self.queue.len(), "submission deferred");
                Notification::SubmissionAccepted {
                    correlation,
                    question,
                    deferred: true,
                }
            }
            Err(e) => {
                tracing::error!(%correlation, error = %e, "failed to queue submission");
                Notification::SubmissionRejected {
                    correlation,
                    kind: FailureKind::Storage(e.to_string()),
                }
            }
        }
    }

    /// The server is reachable again: replay queued submissions in order.
    ///
    /// Each delivered or refused submission is removed and reported. A
    /// connectivity failure stops the drain with the head still queued.
    pub async fn connectivity_regained(&mut self) -> DrainReport {
        self.emit(Notification::ConnectivityRegained);
        let mut report = DrainReport::default();

        while let Some(head) = self.queue.front().cloned() {
            let outcome = match self.deliver(&head).await {
                Delivery::Accepted(question) => {
                    report.delivered += 1;
                    Notification::SubmissionAccepted {
                        correlation: head.correlation,
                        question,
                        deferred: false,
                    }
                }
                Delivery::Rejected(kind) => {
                    report.rejected += 1;
                    Notification::SubmissionRejected {
                        correlation: head.correlation,
                        kind,
                    }
                }
                Delivery::Unreachable => {
                    self.go_offline();
                    report.halted = true;
                    break;
                }
            };

            if let Err(e) = self.queue.drain_next() {
                tracing::error!(correlation = %head.correlation, error = %e, "failed to dequeue delivered submission");
                report.halted = true;
                self.emit(outcome);
                break;
            }
            self.emit(outcome);
        }

        report.remaining = self.queue.len();
        tracing::info!(
            delivered = report.delivered,
            rejected = report.rejected,
            remaining = report.remaining,
            "pending queue drained"
        );
        report
    }

    /// Return to `NORMAL` and discard every queued submission.
    pub fn reset(&mut self) -> Result<(), QueueError> {
        self.queue.clear()?;
        self.transition(SearchEvent::Reset);
        tracing::info!("proxy reset");
        Ok(())
    }

    /// Current state, queue length and cache occupancy.
    pub async fn status(&self) -> Result<ProxyStatus, StorageError> {
        Ok(ProxyStatus {
            state: self.machine.state(),
            queued: self.queue.len(),
            stored: self.cache.store().count().await?,
            overlay: self.cache.stats(),
            buffered: self.machine.buffered(),
        })
    }

    /// Search protocol state.
    pub fn state(&self) -> ProxyState {
        self.machine.state()
    }

    /// The pending-submission queue.
    pub fn queue(&self) -> &PendingQueue {
        &self.queue
    }

    /// The overlay cache.
    pub fn cache(&self) -> &Arc<OverlayCache<St>> {
        &self.cache
    }

    /// The connectivity oracle.
    pub fn connectivity(&self) -> &C {
        &self.connectivity
    }

    fn transition(&mut self, event: SearchEvent) {
        let machine = std::mem::take(&mut self.machine);
        let (next, _) = machine.on_event(event);
        self.machine = next;
    }

    async fn execute(&self, action: SearchAction, failure: &mut Option<FailureKind>) -> Step {
        match action {
            SearchAction::Deliver(question) => Step::Done(Notification::QuestionReady(question)),
            SearchAction::NothingFound => Step::Done(Notification::NothingAvailable(
                failure.take().unwrap_or(FailureKind::NotFound),
            )),

            SearchAction::FetchRandom => {
                let request = self.authorize(OutboundRequest::get(RANDOM_PATH));
                match self.exchange(&request).await {
                    Exchange::Success(body) => match Question::from_json(&body) {
                        Ok(question) => match question.validate() {
                            Ok(()) => {
                                self.remember(&question).await;
                                Step::Done(Notification::QuestionReady(question))
                            }
                            Err(e) => {
                                tracing::warn!(id = ?question.id, error = %e, "invalid random question");
                                Step::Done(Notification::NothingAvailable(
                                    FailureKind::InvalidResponse(e.to_string()),
                                ))
                            }
                        },
                        Err(e) => {
                            tracing::warn!(error = %e, "undecodable random question");
                            Step::Done(Notification::NothingAvailable(
                                FailureKind::InvalidResponse(e.to_string()),
                            ))
                        }
                    },
                    Exchange::Rejected(status) => Step::Done(Notification::NothingAvailable(
                        FailureKind::ClientRejection { status },
                    )),
                    Exchange::Unreachable => Step::Unreachable,
                }
            }

            SearchAction::FetchPage { query, from } => {
                let body = match &from {
                    Some(cursor) => SearchRequest::continue_from(query, cursor),
                    None => SearchRequest::first(query),
                };
                let request = match OutboundRequest::post_json(SEARCH_PATH, &body) {
                    Ok(request) => self.authorize(request),
                    Err(e) => {
                        *failure = Some(FailureKind::InvalidResponse(e.to_string()));
                        return Step::Feed(SearchEvent::Abandoned);
                    }
                };
                match self.exchange(&request).await {
                    Exchange::Success(body) => match SearchPage::from_json(&body) {
                        Ok(page) => {
                            let next = page.cursor();
                            let mut questions = Vec::with_capacity(page.questions.len());
                            for question in page.questions {
                                if let Err(e) = question.validate() {
                                    tracing::warn!(id = ?question.id, error = %e, "skipping invalid search result");
                                    continue;
                                }
                                self.remember(&question).await;
                                questions.push(question);
                            }
                            tracing::debug!(
                                results = questions.len(),
                                more = next.is_some(),
                                "search page received"
                            );
                            Step::Feed(SearchEvent::PageReceived { questions, next })
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "undecodable search page");
                            *failure = Some(FailureKind::InvalidResponse(e.to_string()));
                            Step::Feed(SearchEvent::Abandoned)
                        }
                    },
                    Exchange::Rejected(status) => {
                        *failure = Some(FailureKind::ClientRejection { status });
                        Step::Feed(SearchEvent::Abandoned)
                    }
                    Exchange::Unreachable => Step::Unreachable,
                }
            }

            SearchAction::LoadCachedRandom => match self.cache.random_question().await {
                Ok(Some(question)) => Step::Done(Notification::QuestionReady(question)),
                Ok(None) => Step::Done(Notification::NothingAvailable(FailureKind::NotFound)),
                Err(e) => {
                    tracing::error!(error = %e, "cached random lookup failed");
                    Step::Done(Notification::NothingAvailable(FailureKind::Storage(
                        e.to_string(),
                    )))
                }
            },

            SearchAction::QueryCache { ast } => {
                let predicate = QueryCompiler::compile(&ast);
                tracing::debug!(clause = %predicate.render_inline(), "querying cache");
                match self.cache.query_by_tag(&predicate).await {
                    Ok(questions) => Step::Feed(SearchEvent::MatchesLoaded { questions }),
                    Err(e) => {
                        tracing::error!(error = %e, "cached search failed");
                        *failure = Some(FailureKind::Storage(e.to_string()));
                        Step::Feed(SearchEvent::Abandoned)
                    }
                }
            }
        }
    }

    /// Send one submission and classify the result.
    async fn deliver(&self, pending: &PendingSubmission) -> Delivery {
        match self.exchange(&pending.request).await {
            Exchange::Success(body) => {
                let stored = match Question::from_json(&body) {
                    Ok(question) => question,
                    Err(e) => {
                        tracing::warn!(correlation = %pending.correlation, error = %e, "undecodable submission response");
                        match pending.question() {
                            Ok(question) => question,
                            Err(e) => {
                                return Delivery::Rejected(FailureKind::InvalidResponse(
                                    e.to_string(),
                                ))
                            }
                        }
                    }
                };
                if stored.id.is_some() {
                    self.remember(&stored).await;
                }
                Delivery::Accepted(stored)
            }
            Exchange::Rejected(status) => {
                tracing::debug!(correlation = %pending.correlation, status, "submission refused");
                Delivery::Rejected(FailureKind::ClientRejection { status })
            }
            Exchange::Unreachable => Delivery::Unreachable,
        }
    }

    async fn exchange(&self, request: &OutboundRequest) -> Exchange {
        match self.server.send(request).await {
            Ok(response) => match ResponseClass::from_status(response.status) {
                ResponseClass::Success => Exchange::Success(response.body),
                ResponseClass::ClientRejection { status } => Exchange::Rejected(status),
                ResponseClass::ConnectivityFailure => {
                    tracing::debug!(path = %request.path, status = response.status, "server error");
                    Exchange::Unreachable
                }
            },
            Err(e) => {
                tracing::debug!(path = %request.path, error = %e, "transport failure");
                Exchange::Unreachable
            }
        }
    }

    /// Cache a server question; failures are logged and swallowed.
    async fn remember(&self, question: &Question) {
        if let Err(e) = self.cache.put(question).await {
            tracing::error!(id = ?question.id, error = %e, "failed to cache question");
        }
    }

    fn authorize(&self, request: OutboundRequest) -> OutboundRequest {
        match &self.credential {
            Some(credential) => credential.authorize(request),
            None => request,
        }
    }

    fn go_offline(&self) {
        self.connectivity.report_unreachable();
        tracing::warn!("question bank unreachable, switching to offline mode");
        self.emit(Notification::ConnectivityLost);
    }

    fn emit(&self, notification: Notification) {
        // A dropped receiver only means nobody is listening.
        let _ = self.events.send(notification);
    }
}
