//! The scenario catalog: one suite per endpoint under test.

pub mod course_batch;
pub mod enroll;
pub mod unenroll;

use lmsprobe_core::ScenarioFlags;

use crate::endpoints::Endpoint;

pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const UNAUTHORIZED: u16 = 401;
pub const NOT_FOUND: u16 = 404;

/// Which token the main request carries in `x-authenticated-user-token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// The admin token from the Auth fixture.
    Admin,
    /// The provisioned user's token, falling back to the admin token when the
    /// scenario has no User fixture.
    UserIfProvisioned,
}

/// Scenarios targeting a single endpoint, sharing a template directory.
#[derive(Debug)]
pub struct Suite {
    pub name: &'static str,
    pub template_dir: &'static str,
    pub endpoint: Endpoint,
    pub token: TokenSource,
    pub scenarios: &'static [ScenarioEntry],
}

impl Suite {
    pub fn scenario(&self, name: &str) -> Option<&'static ScenarioEntry> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}

/// One catalog row: which fixtures to provision and what status to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioEntry {
    pub name: &'static str,
    pub fixtures: ScenarioFlags,
    pub expected_status: u16,
    /// Template pair to load; defaults to the scenario name.
    pub template: &'static str,
}

impl ScenarioEntry {
    pub const fn new(name: &'static str, fixtures: ScenarioFlags, expected_status: u16) -> Self {
        Self {
            name,
            fixtures,
            expected_status,
            template: name,
        }
    }
}

/// Every suite in the catalog.
pub fn all() -> [&'static Suite; 3] {
    [&course_batch::SUITE, &enroll::SUITE, &unenroll::SUITE]
}

pub fn find(name: &str) -> Option<&'static Suite> {
    all().into_iter().find(|s| s.name == name)
}
