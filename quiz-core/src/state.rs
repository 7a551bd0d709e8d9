//! Search/pagination state machine for quizsync.
//!
//! This module provides a pure, side-effect-free state machine for the
//! question-request protocol. The machine takes events as input and
//! produces a new state plus a list of actions to execute.
//!
//! The actual I/O (HTTP requests, cache lookups) is performed by
//! quiz-client, which feeds the results back in as events.

use std::collections::VecDeque;
use std::fmt;

use quiz_types::{Question, SearchCursor, SearchQuery, TagQuery};

/// Coarse protocol state, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyState {
    /// No search active; requests return random questions.
    Normal,
    /// A query is set but no results have been fetched yet.
    Searching,
    /// Results are buffered and/or more pages remain.
    Paginating,
}

impl fmt::Display for ProxyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "NORMAL",
            Self::Searching => "SEARCHING",
            Self::Paginating => "PAGINATING",
        })
    }
}

/// Results of an active search that have not been handed out yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    /// The query that produced these results.
    pub query: SearchQuery,
    /// Undelivered results, in delivery order.
    pub buffer: VecDeque<Question>,
    /// Cursor of the next server page, if any.
    pub cursor: Option<SearchCursor>,
}

impl SearchSession {
    /// True once neither buffered results nor further pages remain.
    pub fn is_exhausted(&self) -> bool {
        self.buffer.is_empty() && self.cursor.is_none()
    }
}

/// Search state machine - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMachine {
    /// No search active.
    Normal,
    /// Query set, first page/cache lookup not yet done.
    Searching {
        /// The active query.
        query: SearchQuery,
    },
    /// Delivering results of the active query.
    Paginating {
        /// Buffered results and the next-page cursor.
        session: SearchSession,
    },
}

impl SearchMachine {
    /// Create a new machine in the Normal state.
    pub fn new() -> Self {
        Self::Normal
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function. The caller (quiz-client) is responsible
    /// for executing the returned actions and feeding results back.
    pub fn on_event(self, event: SearchEvent) -> (Self, Vec<SearchAction>) {
        match (self, event) {
            // Any state
            (_, SearchEvent::QueryChanged(query)) => (Self::Searching { query }, vec![]),
            (_, SearchEvent::Reset) => (Self::Normal, vec![]),

            // From Normal
            (Self::Normal, SearchEvent::QuestionRequested { online: true }) => {
                (Self::Normal, vec![SearchAction::FetchRandom])
            }
            (Self::Normal, SearchEvent::QuestionRequested { online: false }) => {
                (Self::Normal, vec![SearchAction::LoadCachedRandom])
            }

            // From Searching
            (Self::Searching { query }, SearchEvent::QuestionRequested { online: true }) => {
                let action = SearchAction::FetchPage {
                    query: query.text.clone(),
                    from: None,
                };
                (Self::Searching { query }, vec![action])
            }
            (Self::Searching { query }, SearchEvent::QuestionRequested { online: false }) => {
                let action = SearchAction::QueryCache {
                    ast: query.ast.clone(),
                };
                (Self::Searching { query }, vec![action])
            }
            (Self::Searching { query }, SearchEvent::MatchesLoaded { questions }) => {
                deliver_first(query, questions, None)
            }

            // From Paginating
            (Self::Paginating { mut session }, SearchEvent::QuestionRequested { online }) => {
                if let Some(question) = session.buffer.pop_front() {
                    let next = if session.is_exhausted() {
                        Self::Normal
                    } else {
                        Self::Paginating { session }
                    };
                    return (next, vec![SearchAction::Deliver(question)]);
                }
                match (online, session.cursor.clone()) {
                    (true, Some(cursor)) => {
                        let action = SearchAction::FetchPage {
                            query: session.query.text.clone(),
                            from: Some(cursor),
                        };
                        (Self::Paginating { session }, vec![action])
                    }
                    // Offline with only a server cursor left, or nothing left at all.
                    _ => (Self::Normal, vec![SearchAction::NothingFound]),
                }
            }

            // Page results apply to both a first page and a follow-up page.
            (Self::Searching { query }, SearchEvent::PageReceived { questions, next })
            | (
                Self::Paginating {
                    session: SearchSession { query, .. },
                },
                SearchEvent::PageReceived { questions, next },
            ) => deliver_first(query, questions, next),

            (Self::Searching { .. } | Self::Paginating { .. }, SearchEvent::Abandoned) => {
                (Self::Normal, vec![SearchAction::NothingFound])
            }

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// The coarse state of the machine.
    pub fn state(&self) -> ProxyState {
        match self {
            Self::Normal => ProxyState::Normal,
            Self::Searching { .. } => ProxyState::Searching,
            Self::Paginating { .. } => ProxyState::Paginating,
        }
    }

    /// The active query, if any.
    pub fn query(&self) -> Option<&SearchQuery> {
        match self {
            Self::Normal => None,
            Self::Searching { query } => Some(query),
            Self::Paginating { session } => Some(&session.query),
        }
    }

    /// Number of buffered, undelivered results.
    pub fn buffered(&self) -> usize {
        match self {
            Self::Paginating { session } => session.buffer.len(),
            _ => 0,
        }
    }
}

impl Default for SearchMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Start (or continue) delivering a batch of results.
///
/// An empty batch with a live cursor asks for the following page; an empty
/// batch without one ends the session. Otherwise the first result is
/// delivered and the rest are buffered behind it.
fn deliver_first(
    query: SearchQuery,
    questions: Vec<Question>,
    cursor: Option<SearchCursor>,
) -> (SearchMachine, Vec<SearchAction>) {
    let mut buffer: VecDeque<Question> = questions.into();
    let Some(first) = buffer.pop_front() else {
        return match cursor {
            Some(cursor) => {
                let action = SearchAction::FetchPage {
                    query: query.text.clone(),
                    from: Some(cursor.clone()),
                };
                let session = SearchSession {
                    query,
                    buffer,
                    cursor: Some(cursor),
                };
                (SearchMachine::Paginating { session }, vec![action])
            }
            None => (SearchMachine::Normal, vec![SearchAction::NothingFound]),
        };
    };

    let session = SearchSession {
        query,
        buffer,
        cursor,
    };
    let next = if session.is_exhausted() {
        SearchMachine::Normal
    } else {
        SearchMachine::Paginating { session }
    };
    (next, vec![SearchAction::Deliver(first)])
}

/// Inputs to the search state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A new search query was set (replaces any active session).
    QueryChanged(SearchQuery),
    /// The caller asked for the next question.
    QuestionRequested {
        /// Whether the server is believed reachable.
        online: bool,
    },
    /// The server returned a search page.
    PageReceived {
        /// Questions on the page, in server order.
        questions: Vec<Question>,
        /// Cursor of the following page.
        next: Option<SearchCursor>,
    },
    /// The local store returned all matches of the query.
    MatchesLoaded {
        /// Matching questions, in store order.
        questions: Vec<Question>,
    },
    /// The server refused the search; the session cannot continue.
    Abandoned,
    /// Return to Normal, dropping any session.
    Reset,
}

/// Actions to be executed by quiz-client.
///
/// These are instructions, not side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    /// `GET /quizquestions/random`.
    FetchRandom,
    /// `POST /search`, optionally continuing from a cursor.
    FetchPage {
        /// Query string, verbatim.
        query: String,
        /// Cursor to continue from.
        from: Option<SearchCursor>,
    },
    /// Pick a random question from the local cache.
    LoadCachedRandom,
    /// Run the query against the local cache.
    QueryCache {
        /// The parsed expression to compile.
        ast: TagQuery,
    },
    /// Hand this question to the caller.
    Deliver(Question),
    /// Report that nothing is available.
    NothingFound,
}
