//! # quiz-types
//!
//! Data and wire types shared by every quizsync crate:
//! - [`Question`] - a quiz question and its validation rules
//! - [`QuestionId`], [`SearchCursor`], [`CorrelationId`] - identity and paging tokens
//! - [`TagQuery`], [`SearchQuery`] - the parsed tag-search expression
//! - [`SearchRequest`], [`SearchPage`], [`OutboundRequest`] - question-bank wire messages
//! - [`PendingSubmission`] - a deferred submission and its on-disk codec

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod messages;
mod pending;
mod query;
mod question;

pub use error::{CodecError, ValidationError};
pub use ids::{CorrelationId, QuestionId, SearchCursor};
pub use messages::{Method, OutboundRequest, SearchPage, SearchRequest, ServerResponse};
pub use pending::{
    decode_queue, encode_queue, PendingSubmission, QUEUE_FORMAT_VERSION, QUEUE_MAGIC,
};
pub use query::{SearchQuery, TagQuery};
pub use question::Question;
