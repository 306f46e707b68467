//! Per-scenario variable store.
//!
//! A [`TestContext`] is created when a scenario starts and dropped when it
//! ends. Fixture providers write the identifiers they create into it; the
//! template renderer reads from it. Nothing in here is shared between
//! scenarios.

use std::collections::HashMap;

use chrono::{NaiveDate, TimeDelta};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{HarnessError, Result};

/// Well-known variable names written by the runner and the fixture providers.
pub mod vars {
    pub const TODAY: &str = "today";
    pub const START_DATE: &str = "startDate";
    pub const END_DATE: &str = "endDate";
    pub const RUN_ID: &str = "runId";

    pub const ACCESS_TOKEN: &str = "accessToken";

    pub const ROOT_ORG_CHANNEL: &str = "rootOrgChannel";
    pub const ORGANISATION_ID: &str = "organisationId";

    pub const USER_ID: &str = "userId";
    pub const USER_NAME: &str = "userName";
    pub const USER_AUTH_TOKEN: &str = "userAuthToken";

    pub const COURSE_UNIT_ID: &str = "courseUnitId";
    pub const RESOURCE_ID: &str = "resourceId";
    pub const COURSE_ID: &str = "courseId";

    pub const BATCH_ID: &str = "batchId";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestContext {
    vars: HashMap<String, Value>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a variable. Values are stored as given.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        self.vars
            .get(name)
            .ok_or_else(|| HarnessError::MissingVariable {
                name: name.to_string(),
            })
    }

    /// Like [`get`](Self::get), but the value must be a JSON string.
    pub fn get_str(&self, name: &str) -> Result<&str> {
        self.get(name)?
            .as_str()
            .ok_or_else(|| HarnessError::NotAString {
                name: name.to_string(),
            })
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Insert every default whose name is not already set.
    pub fn merge_defaults<I, K, V>(&mut self, defaults: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in defaults {
            self.vars.entry(name.into()).or_insert_with(|| value.into());
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Values every scenario starts with: the date variables and a short run id
/// used to make entity names unique.
///
/// Fails when `today + batch_days` is not a representable date.
pub fn scenario_defaults(
    today: NaiveDate,
    batch_days: i64,
) -> Result<Vec<(&'static str, Value)>> {
    let end = TimeDelta::try_days(batch_days)
        .and_then(|span| today.checked_add_signed(span))
        .ok_or(HarnessError::DateOutOfRange {
            start: today,
            days: batch_days,
        })?;
    let run_id = Uuid::new_v4().simple().to_string();
    Ok(vec![
        (vars::TODAY, Value::String(today.format("%Y-%m-%d").to_string())),
        (
            vars::START_DATE,
            Value::String(today.format("%Y-%m-%d").to_string()),
        ),
        (vars::END_DATE, Value::String(end.format("%Y-%m-%d").to_string())),
        (vars::RUN_ID, Value::String(run_id[..12].to_string())),
    ])
}
