//! Error taxonomy for the data model (§7 of the specification): kinds
//! distinct from their trigger, driving routing decisions upstream.

use thiserror::Error;

/// Errors raised while constructing or validating core event types.
///
/// `MissingField`/`Blank` are construction failures (a required field was
/// absent or empty) and are distinct from `InvalidEvent`, which is the
/// validator rejecting an otherwise-complete envelope (e.g. `occurredAt >
/// publishedAt`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field must not be blank: {0}")]
    Blank(&'static str),

    #[error("invalid event: {0}")]
    InvalidEvent(String),
}
