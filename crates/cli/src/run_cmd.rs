use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use lmsprobe_core::{DirTemplates, FixturePlan, ScenarioFlags};
use lmsprobe_e2e::runner::ScenarioReport;
use lmsprobe_e2e::specs::{self, Suite};
use lmsprobe_e2e::{FailureCategory, Harness, SuiteReport};

use crate::config::LoadedConfig;

#[derive(Args)]
pub struct RunArgs {
    /// Run a single suite: create_batch, enroll or unenroll
    #[arg(long)]
    pub suite: Option<String>,

    /// Filter scenarios by substring of `suite::scenario`
    #[arg(long)]
    pub filter: Option<String>,

    /// Run scenarios one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Override the service base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Fail on response fields the templates do not list
    #[arg(long)]
    pub strict: bool,
}

/// How a run ended, mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    /// Only assertion failures.
    Failed,
    /// At least one setup or transport failure.
    Environment,
}

impl RunStatus {
    pub fn of(report: &SuiteReport) -> Self {
        if report.environment_failures() > 0 {
            Self::Environment
        } else if report.failed() > 0 {
            Self::Failed
        } else {
            Self::Passed
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Self::Passed => 0,
            Self::Failed => 1,
            Self::Environment => 2,
        }
    }
}

pub async fn run(args: RunArgs, loaded: LoadedConfig) -> Result<RunStatus> {
    let suites = select_suites(args.suite.as_deref())?;
    let templates = DirTemplates::new(loaded.template_root());

    let mut config = loaded.config;
    if let Some(base_url) = args.base_url {
        config.service.base_url = base_url;
    }
    if args.strict {
        config.validation.strict = true;
    }
    let parallel = config.runner.parallel && !args.sequential;

    eprintln!(
        "Running {} against {} ({})",
        suites.iter().map(|s| s.name).collect::<Vec<_>>().join(", "),
        config.service.base_url,
        if parallel { "parallel" } else { "sequential" }
    );

    let harness = Harness::connect(config, templates).context("Failed to set up HTTP client")?;
    let report = lmsprobe_e2e::run_suites(
        Arc::new(harness),
        &suites,
        args.filter.as_deref(),
        parallel,
    )
    .await;
    if report.total() == 0 {
        bail!("no scenarios matched");
    }

    for r in &report.results {
        print_result(r);
    }
    eprintln!(
        "\n{} passed, {} failed ({} setup, {} transport), {} total",
        report.passed(),
        report.failed(),
        report.count(FailureCategory::Setup),
        report.count(FailureCategory::Transport),
        report.total()
    );

    Ok(RunStatus::of(&report))
}

fn print_result(r: &ScenarioReport) {
    let label = match r.category() {
        None => "PASS",
        Some(FailureCategory::Assertion) => "FAIL",
        Some(FailureCategory::Setup) => "SETUP",
        Some(FailureCategory::Transport) => "TRANSPORT",
    };
    let dur = format!("{:.0}ms", r.duration.as_secs_f64() * 1000.0);
    eprintln!("  {label} {name} ({dur})", name = r.qualified_name());
    if let Some(err) = r.error() {
        for line in err.lines() {
            eprintln!("       {line}");
        }
    }
}

/// Print the catalog.
pub fn list(suite: Option<&str>) -> Result<()> {
    for suite in select_suites(suite)? {
        println!(
            "{} ({} scenarios, templates in {})",
            suite.name,
            suite.scenarios.len(),
            suite.template_dir
        );
        for entry in suite.scenarios {
            println!(
                "  {:<64} {} {}",
                entry.name,
                entry.expected_status,
                fixture_label(&entry.fixtures)
            );
        }
    }
    Ok(())
}

fn fixture_label(flags: &ScenarioFlags) -> String {
    let plan = FixturePlan::resolve(flags);
    if plan.is_empty() {
        return "-".to_string();
    }
    plan.steps()
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn select_suites(name: Option<&str>) -> Result<Vec<&'static Suite>> {
    match name {
        None => Ok(specs::all().to_vec()),
        Some(name) => match specs::find(name) {
            Some(suite) => Ok(vec![suite]),
            None => {
                let known: Vec<_> = specs::all().iter().map(|s| s.name).collect();
                bail!("unknown suite `{name}` (expected one of: {})", known.join(", "))
            }
        },
    }
}
