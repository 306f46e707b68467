use lmsprobe_core::{BatchPolicy, EnrollmentState, ScenarioFlags};

use super::{ScenarioEntry, Suite, TokenSource, BAD_REQUEST, OK};
use crate::endpoints::Endpoint;

const USER_OPEN: ScenarioFlags = ScenarioFlags::NONE.user().batch(BatchPolicy::Open);
const USER_INVITE_ONLY: ScenarioFlags = ScenarioFlags::NONE.user().batch(BatchPolicy::InviteOnly);

pub static SUITE: Suite = Suite {
    name: "enroll",
    template_dir: "course/batch/enroll",
    endpoint: Endpoint::Enroll,
    token: TokenSource::UserIfProvisioned,
    scenarios: SCENARIOS,
};

const SCENARIOS: &[ScenarioEntry] = &[
    ScenarioEntry::new("testEnrollCourseSuccess", USER_OPEN, OK),
    ScenarioEntry::new(
        "testEnrollCourseSuccessForUserUnenrolled",
        USER_OPEN.enrollment(EnrollmentState::Unenrolled),
        OK,
    ),
    ScenarioEntry::new("testEnrollCourseFailureWithoutCourseId", USER_OPEN, BAD_REQUEST),
    ScenarioEntry::new("testEnrollCourseFailureWithoutBatchId", USER_OPEN, BAD_REQUEST),
    ScenarioEntry::new("testEnrollCourseFailureWithoutUserId", USER_OPEN, BAD_REQUEST),
    ScenarioEntry::new(
        "testEnrollCourseFailureForInviteOnlyBatch",
        USER_INVITE_ONLY,
        BAD_REQUEST,
    ),
    ScenarioEntry::new("testEnrollCourseFailureForInvalidBatchId", USER_OPEN, BAD_REQUEST),
    ScenarioEntry::new(
        "testEnrollCourseFailureWithUserAlreadyEnrolled",
        USER_OPEN.enrollment(EnrollmentState::Enrolled),
        BAD_REQUEST,
    ),
];
