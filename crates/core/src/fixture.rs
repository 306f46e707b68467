//! Fixture kinds, their dependency graph, and per-scenario fixture selection.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::{vars, TestContext};
use crate::error::{HarnessError, Result};

/// Prerequisite entity kinds, declared in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    /// Admin token issuance. Every other kind depends on it.
    Auth,
    Org,
    User,
    Content,
    CourseBatch,
    Enrollment,
}

impl FixtureKind {
    pub const ALL: [FixtureKind; 6] = [
        Self::Auth,
        Self::Org,
        Self::User,
        Self::Content,
        Self::CourseBatch,
        Self::Enrollment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Org => "org",
            Self::User => "user",
            Self::Content => "content",
            Self::CourseBatch => "course_batch",
            Self::Enrollment => "enrollment",
        }
    }

    pub fn spec(self) -> &'static FixtureSpec {
        match self {
            Self::Auth => &AUTH,
            Self::Org => &ORG,
            Self::User => &USER,
            Self::Content => &CONTENT,
            Self::CourseBatch => &COURSE_BATCH,
            Self::Enrollment => &ENROLLMENT,
        }
    }
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creation contract of one fixture kind.
#[derive(Debug)]
pub struct FixtureSpec {
    pub kind: FixtureKind,
    /// Kinds that must run first.
    pub depends_on: &'static [FixtureKind],
    /// Variables that must be in the context before provisioning.
    pub requires: &'static [&'static str],
    /// Variables written on success.
    pub produces: &'static [&'static str],
}

impl FixtureSpec {
    /// Fail with `UnmetDependency` on the first required variable that is absent.
    pub fn check(&self, ctx: &TestContext) -> Result<()> {
        match self.requires.iter().find(|name| !ctx.has(name)) {
            Some(missing) => Err(HarnessError::UnmetDependency {
                fixture: self.kind,
                variable: (*missing).to_string(),
            }),
            None => Ok(()),
        }
    }
}

static AUTH: FixtureSpec = FixtureSpec {
    kind: FixtureKind::Auth,
    depends_on: &[],
    requires: &[],
    produces: &[vars::ACCESS_TOKEN],
};

static ORG: FixtureSpec = FixtureSpec {
    kind: FixtureKind::Org,
    depends_on: &[FixtureKind::Auth],
    requires: &[vars::ACCESS_TOKEN],
    produces: &[vars::ROOT_ORG_CHANNEL, vars::ORGANISATION_ID],
};

static USER: FixtureSpec = FixtureSpec {
    kind: FixtureKind::User,
    depends_on: &[FixtureKind::Auth],
    requires: &[vars::ACCESS_TOKEN],
    produces: &[vars::USER_ID, vars::USER_NAME, vars::USER_AUTH_TOKEN],
};

static CONTENT: FixtureSpec = FixtureSpec {
    kind: FixtureKind::Content,
    depends_on: &[FixtureKind::Auth],
    requires: &[vars::ACCESS_TOKEN],
    produces: &[vars::COURSE_UNIT_ID, vars::RESOURCE_ID, vars::COURSE_ID],
};

static COURSE_BATCH: FixtureSpec = FixtureSpec {
    kind: FixtureKind::CourseBatch,
    depends_on: &[FixtureKind::Content],
    requires: &[vars::ACCESS_TOKEN, vars::COURSE_ID],
    produces: &[vars::BATCH_ID],
};

static ENROLLMENT: FixtureSpec = FixtureSpec {
    kind: FixtureKind::Enrollment,
    depends_on: &[FixtureKind::User, FixtureKind::CourseBatch],
    requires: &[
        vars::COURSE_ID,
        vars::BATCH_ID,
        vars::USER_ID,
        vars::USER_AUTH_TOKEN,
    ],
    produces: &[],
};

/// Enrollment policy of a provisioned batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchPolicy {
    Open,
    InviteOnly,
}

impl BatchPolicy {
    /// Wire value of the batch `enrollmentType` field.
    pub fn enrollment_type(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InviteOnly => "invite-only",
        }
    }
}

/// Where the Enrollment fixture leaves the provisioned user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentState {
    #[default]
    None,
    Enrolled,
    /// Enrolled, then unenrolled again.
    Unenrolled,
}

/// Which fixtures a scenario needs before its main request.
///
/// Selecting a kind pulls in everything it depends on, so `batch` implies a
/// course and `enrollment` implies a user and a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScenarioFlags {
    /// Skip admin token issuance. Ignored when any other fixture is selected.
    pub anonymous: bool,
    pub org: bool,
    pub user: bool,
    pub course: bool,
    pub batch: Option<BatchPolicy>,
    pub enrollment: EnrollmentState,
}

impl ScenarioFlags {
    /// Only the admin token.
    pub const NONE: Self = Self {
        anonymous: false,
        org: false,
        user: false,
        course: false,
        batch: None,
        enrollment: EnrollmentState::None,
    };

    pub const fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub const fn org(mut self) -> Self {
        self.org = true;
        self
    }

    pub const fn user(mut self) -> Self {
        self.user = true;
        self
    }

    pub const fn course(mut self) -> Self {
        self.course = true;
        self
    }

    pub const fn batch(mut self, policy: BatchPolicy) -> Self {
        self.batch = Some(policy);
        self
    }

    pub const fn enrollment(mut self, state: EnrollmentState) -> Self {
        self.enrollment = state;
        self
    }

    fn selected(&self) -> BTreeSet<FixtureKind> {
        let mut kinds = BTreeSet::new();
        if !self.anonymous {
            kinds.insert(FixtureKind::Auth);
        }
        if self.org {
            kinds.insert(FixtureKind::Org);
        }
        if self.user {
            kinds.insert(FixtureKind::User);
        }
        if self.course {
            kinds.insert(FixtureKind::Content);
        }
        if self.batch.is_some() {
            kinds.insert(FixtureKind::CourseBatch);
        }
        if self.enrollment != EnrollmentState::None {
            kinds.insert(FixtureKind::Enrollment);
        }
        kinds
    }
}

/// Fixture kinds to provision for one scenario, in dependency order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePlan {
    steps: Vec<FixtureKind>,
}

impl FixturePlan {
    pub fn resolve(flags: &ScenarioFlags) -> Self {
        let mut remaining = flags.selected();

        let mut stack: Vec<FixtureKind> = remaining.iter().copied().collect();
        while let Some(kind) = stack.pop() {
            for dep in kind.spec().depends_on {
                if remaining.insert(*dep) {
                    stack.push(*dep);
                }
            }
        }

        let mut steps = Vec::with_capacity(remaining.len());
        while !remaining.is_empty() {
            let ready: Vec<FixtureKind> = remaining
                .iter()
                .copied()
                .filter(|kind| {
                    kind.spec()
                        .depends_on
                        .iter()
                        .all(|dep| !remaining.contains(dep))
                })
                .collect();
            if ready.is_empty() {
                break;
            }
            for kind in ready {
                remaining.remove(&kind);
                steps.push(kind);
            }
        }

        Self { steps }
    }

    pub fn steps(&self) -> &[FixtureKind] {
        &self.steps
    }

    pub fn contains(&self, kind: FixtureKind) -> bool {
        self.steps.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
