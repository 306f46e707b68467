pub mod client;
pub mod endpoints;
pub mod fixtures;
pub mod runner;
pub mod specs;

pub use client::Harness;
pub use runner::{run_scenario, run_suites, FailureCategory, ScenarioReport, SuiteReport};

/// Template tree shipped with this crate.
pub fn bundled_templates_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}
