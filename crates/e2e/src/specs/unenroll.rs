use lmsprobe_core::{BatchPolicy, EnrollmentState, ScenarioFlags};

use super::{ScenarioEntry, Suite, TokenSource, BAD_REQUEST, OK, UNAUTHORIZED};
use crate::endpoints::Endpoint;

const NONE: ScenarioFlags = ScenarioFlags::NONE;
const USER_OPEN: ScenarioFlags = ScenarioFlags::NONE.user().batch(BatchPolicy::Open);

pub static SUITE: Suite = Suite {
    name: "unenroll",
    template_dir: "course/batch/unenroll",
    endpoint: Endpoint::Unenroll,
    token: TokenSource::UserIfProvisioned,
    scenarios: SCENARIOS,
};

const SCENARIOS: &[ScenarioEntry] = &[
    ScenarioEntry::new("testUnenrollCourseFailureWithoutCourseId", NONE, BAD_REQUEST),
    ScenarioEntry::new("testUnenrollCourseFailureWithoutBatchId", NONE, BAD_REQUEST),
    ScenarioEntry::new("testUnenrollCourseFailureWithoutUserId", NONE, BAD_REQUEST),
    ScenarioEntry::new(
        "testUnenrollCourseFailureForInviteOnlyBatch",
        ScenarioFlags::NONE.user().batch(BatchPolicy::InviteOnly),
        BAD_REQUEST,
    ),
    ScenarioEntry::new("testUnenrollCourseFailureForInvalidCourseId", USER_OPEN, BAD_REQUEST),
    ScenarioEntry::new("testUnenrollCourseFailureForInvalidUserId", USER_OPEN, UNAUTHORIZED),
    ScenarioEntry::new("testUnenrollCourseFailureForInvalidBatchId", USER_OPEN, BAD_REQUEST),
    ScenarioEntry::new("testUnenrollCourseFailureWithUserNotEnrolled", USER_OPEN, BAD_REQUEST),
    ScenarioEntry::new(
        "testUnenrollCourseFailureWithUserAlreadyUnenrolled",
        USER_OPEN.enrollment(EnrollmentState::Unenrolled),
        BAD_REQUEST,
    ),
    ScenarioEntry::new(
        "testUnenrollCourseSuccess",
        USER_OPEN.enrollment(EnrollmentState::Enrolled),
        OK,
    ),
];
