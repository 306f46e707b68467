use chrono::NaiveDate;

use crate::fixture::FixtureKind;

/// A request never produced an HTTP response (connection refused, DNS, timeout).
///
/// HTTP error statuses are not transport errors; they come back as a normal
/// [`HttpResponse`](crate::request::HttpResponse).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{method} {url} failed: {reason}")]
pub struct TransportError {
    pub method: String,
    pub url: String,
    pub reason: String,
    pub timed_out: bool,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HarnessError {
    #[error("missing variable: {name}")]
    MissingVariable { name: String },

    #[error("variable {name} is not a string")]
    NotAString { name: String },

    #[error("{fixture} fixture requires `{variable}`, which is not in the test context")]
    UnmetDependency {
        fixture: FixtureKind,
        variable: String,
    },

    #[error("failed to provision {kind} fixture ({status}): {body}")]
    FixtureProvisionFailure {
        kind: FixtureKind,
        status: u16,
        body: String,
    },

    #[error("{kind} fixture response has no `{field}`")]
    MissingOutput { kind: FixtureKind, field: String },

    #[error("unresolved placeholder ${{{name}}} in {template}")]
    UnresolvedPlaceholder { name: String, template: String },

    #[error("{start} + {days} days is not a valid date (check fixtures.batch_days)")]
    DateOutOfRange { start: NaiveDate, days: i64 },

    #[error("template {name}: {reason}")]
    Template { name: String, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
