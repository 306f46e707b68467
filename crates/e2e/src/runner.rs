use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use lmsprobe_api_client::HttpExecutor;
use lmsprobe_core::{
    vars, ExpectedResponse, FixturePlan, HarnessError, RenderedRequest, TestContext,
    TransportError, ValidationResult,
};

use crate::client::Harness;
use crate::fixtures;
use crate::specs::{ScenarioEntry, Suite, TokenSource};

/// Where a scenario is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    Init,
    FixturesProvisioning,
    RequestRendering,
    RequestExecuting,
    Validating,
    Passed,
    Failed,
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::FixturesProvisioning => "fixtures",
            Self::RequestRendering => "rendering",
            Self::RequestExecuting => "executing",
            Self::Validating => "validating",
            Self::Passed => "passed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Why a scenario failed.
#[derive(Debug)]
pub enum FailureCause {
    /// The harness could not set the scenario up: templates, variables or fixtures.
    Setup(HarnessError),
    /// The service never answered.
    Transport(TransportError),
    /// The service answered, differently than expected.
    Assertion(ValidationResult),
    /// The scenario task panicked or was cancelled before producing a report.
    Aborted(String),
}

/// Coarse grouping of [`FailureCause`] for reporting and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Setup,
    Transport,
    Assertion,
}

impl FailureCause {
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Setup(_) | Self::Aborted(_) => FailureCategory::Setup,
            Self::Transport(_) => FailureCategory::Transport,
            Self::Assertion(_) => FailureCategory::Assertion,
        }
    }
}

impl From<HarnessError> for FailureCause {
    fn from(err: HarnessError) -> Self {
        match err {
            HarnessError::Transport(e) => Self::Transport(e),
            other => Self::Setup(other),
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup(e) => write!(f, "setup: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Assertion(result) => write!(f, "assertion: {}", result.summary()),
            Self::Aborted(reason) => write!(f, "aborted: {reason}"),
        }
    }
}

#[derive(Debug)]
pub struct ScenarioFailure {
    /// State the scenario was in when it failed.
    pub state: ScenarioState,
    pub cause: FailureCause,
}

#[derive(Debug)]
pub enum Outcome {
    Passed,
    Failed(ScenarioFailure),
}

/// Result of running a single scenario.
#[derive(Debug)]
pub struct ScenarioReport {
    pub suite: &'static str,
    pub name: &'static str,
    pub outcome: Outcome,
    pub duration: Duration,
}

impl ScenarioReport {
    fn aborted(suite: &'static Suite, entry: &'static ScenarioEntry, reason: String) -> Self {
        Self {
            suite: suite.name,
            name: entry.name,
            outcome: Outcome::Failed(ScenarioFailure {
                state: ScenarioState::Failed,
                cause: FailureCause::Aborted(reason),
            }),
            duration: Duration::ZERO,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed)
    }

    pub fn failure(&self) -> Option<&ScenarioFailure> {
        match &self.outcome {
            Outcome::Passed => None,
            Outcome::Failed(f) => Some(f),
        }
    }

    pub fn category(&self) -> Option<FailureCategory> {
        self.failure().map(|f| f.cause.category())
    }

    /// `suite::name`, the string filters match against.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.suite, self.name)
    }

    pub fn error(&self) -> Option<String> {
        self.failure().map(|f| format!("[{}] {}", f.state, f.cause))
    }
}

/// Aggregated results of a run.
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub results: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.passed()).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn count(&self, category: FailureCategory) -> usize {
        self.results
            .iter()
            .filter(|r| r.category() == Some(category))
            .count()
    }

    /// Failures caused by the environment rather than the service's answer.
    pub fn environment_failures(&self) -> usize {
        self.count(FailureCategory::Setup) + self.count(FailureCategory::Transport)
    }
}

/// Run one scenario end to end: fixtures, render, send once, validate.
pub async fn run_scenario<E: HttpExecutor>(
    harness: &Harness<E>,
    suite: &'static Suite,
    entry: &'static ScenarioEntry,
) -> ScenarioReport {
    let start = Instant::now();
    let mut run = ScenarioRun {
        harness,
        suite,
        entry,
        state: ScenarioState::Init,
    };

    let outcome = match run.execute().await {
        Ok(()) => {
            run.advance(ScenarioState::Passed);
            info!(suite = suite.name, scenario = entry.name, "passed");
            Outcome::Passed
        }
        Err(cause) => {
            let failed_in = run.state;
            run.advance(ScenarioState::Failed);
            warn!(
                suite = suite.name,
                scenario = entry.name,
                state = %failed_in,
                error = %cause,
                "failed"
            );
            Outcome::Failed(ScenarioFailure {
                state: failed_in,
                cause,
            })
        }
    };

    ScenarioReport {
        suite: suite.name,
        name: entry.name,
        outcome,
        duration: start.elapsed(),
    }
}

struct ScenarioRun<'a, E> {
    harness: &'a Harness<E>,
    suite: &'static Suite,
    entry: &'static ScenarioEntry,
    state: ScenarioState,
}

impl<E: HttpExecutor> ScenarioRun<'_, E> {
    fn advance(&mut self, next: ScenarioState) {
        debug!(scenario = self.entry.name, from = %self.state, to = %next, "transition");
        self.state = next;
    }

    async fn execute(&mut self) -> Result<(), FailureCause> {
        let harness = self.harness;
        let mut ctx = harness.new_context()?;
        let templates = harness
            .templates()
            .load(self.suite.template_dir, self.entry.template)?;

        self.advance(ScenarioState::FixturesProvisioning);
        let flags = self.entry.fixtures;
        for kind in FixturePlan::resolve(&flags).steps() {
            fixtures::provision(harness, *kind, &flags, &mut ctx).await?;
        }

        self.advance(ScenarioState::RequestRendering);
        let rendered = templates.render(&ctx)?;
        let request = self.build_request(&ctx, rendered.request)?;

        self.advance(ScenarioState::RequestExecuting);
        let response = harness
            .executor()
            .send(&request)
            .await
            .map_err(FailureCause::Transport)?;

        self.advance(ScenarioState::Validating);
        let expected = ExpectedResponse {
            status: self.entry.expected_status,
            body: rendered.expected,
        };
        let result = harness.validator().validate(&expected, &response);
        if result.passed {
            Ok(())
        } else {
            Err(FailureCause::Assertion(result))
        }
    }

    fn build_request(
        &self,
        ctx: &TestContext,
        body: serde_json::Value,
    ) -> lmsprobe_core::Result<RenderedRequest> {
        let token_var = match self.suite.token {
            TokenSource::UserIfProvisioned if ctx.has(vars::USER_AUTH_TOKEN) => {
                Some(vars::USER_AUTH_TOKEN)
            }
            _ if ctx.has(vars::ACCESS_TOKEN) => Some(vars::ACCESS_TOKEN),
            _ => None,
        };
        let token = token_var.map(|name| ctx.get_str(name)).transpose()?;
        Ok(self
            .harness
            .api_request(self.suite.endpoint, token)
            .json(body))
    }
}

/// Run the scenarios of `suites` whose `suite::name` contains `filter`.
///
/// Scenarios run concurrently on a `JoinSet` unless `parallel` is false;
/// each owns its own context either way. Results come back sorted by name.
pub async fn run_suites<E: HttpExecutor + 'static>(
    harness: Arc<Harness<E>>,
    suites: &[&'static Suite],
    filter: Option<&str>,
    parallel: bool,
) -> SuiteReport {
    let selected: Vec<(&'static Suite, &'static ScenarioEntry)> = suites
        .iter()
        .flat_map(|suite| suite.scenarios.iter().map(move |entry| (*suite, entry)))
        .filter(|(suite, entry)| {
            filter.is_none_or(|f| format!("{}::{}", suite.name, entry.name).contains(f))
        })
        .collect();
    info!(scenarios = selected.len(), parallel, "running");

    let mut results = Vec::with_capacity(selected.len());
    if parallel {
        let mut set = JoinSet::new();
        let mut pending = HashMap::with_capacity(selected.len());
        for (suite, entry) in selected {
            let harness = harness.clone();
            let handle = set.spawn(async move { run_scenario(&harness, suite, entry).await });
            pending.insert(handle.id(), (suite, entry));
        }
        while let Some(joined) = set.join_next_with_id().await {
            match joined {
                Ok((id, report)) => {
                    pending.remove(&id);
                    results.push(report);
                }
                Err(e) => {
                    let Some((suite, entry)) = pending.remove(&e.id()) else {
                        warn!(error = %e, "untracked scenario task did not complete");
                        continue;
                    };
                    warn!(suite = suite.name, scenario = entry.name, error = %e, "aborted");
                    results.push(ScenarioReport::aborted(suite, entry, e.to_string()));
                }
            }
        }
    } else {
        for (suite, entry) in selected {
            results.push(run_scenario(&harness, suite, entry).await);
        }
    }

    results.sort_by(|a, b| (a.suite, a.name).cmp(&(b.suite, b.name)));
    SuiteReport { results }
}
