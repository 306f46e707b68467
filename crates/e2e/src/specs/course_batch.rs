use lmsprobe_core::ScenarioFlags;

use super::{ScenarioEntry, Suite, TokenSource, BAD_REQUEST, NOT_FOUND, OK};
use crate::endpoints::Endpoint;

const NONE: ScenarioFlags = ScenarioFlags::NONE;
const COURSE: ScenarioFlags = ScenarioFlags::NONE.course();
const COURSE_USER: ScenarioFlags = COURSE.user();
const COURSE_ORG: ScenarioFlags = COURSE.org();
const COURSE_ORG_USER: ScenarioFlags = COURSE.org().user();

pub static SUITE: Suite = Suite {
    name: "create_batch",
    template_dir: "course/batch/create",
    endpoint: Endpoint::BatchCreate,
    token: TokenSource::Admin,
    scenarios: SCENARIOS,
};

// The batch under test is the main request, so no scenario selects a batch fixture.
const SCENARIOS: &[ScenarioEntry] = &[
    // failures
    ScenarioEntry::new("testCreateCourseBatchFailureWithoutName", NONE, BAD_REQUEST),
    ScenarioEntry::new("testCreateCourseBatchFailureWithoutCourseId", NONE, BAD_REQUEST),
    ScenarioEntry::new("testCreateCourseBatchFailureWithoutEnrollmentType", NONE, BAD_REQUEST),
    ScenarioEntry::new("testCreateCourseBatchFailureInvalidEnrollmentType", NONE, BAD_REQUEST),
    ScenarioEntry::new("testCreateCourseBatchFailureWithoutStartDate", NONE, BAD_REQUEST),
    ScenarioEntry::new("testCreateCourseBatchFailurePastStartDate", NONE, BAD_REQUEST),
    ScenarioEntry::new("testCreateCourseBatchFailureInvalidCourseId", NONE, BAD_REQUEST),
    ScenarioEntry::new("testCreateCourseBatchFailurePastEndDate", NONE, BAD_REQUEST),
    ScenarioEntry::new("testCreateCourseBatchFailureEndDateBeforeStartDate", NONE, BAD_REQUEST),
    ScenarioEntry::new(
        "testCreateCourseBatchFailureInviteOnlyWithInvalidCreatedFor",
        COURSE,
        BAD_REQUEST,
    ),
    ScenarioEntry::new(
        "testCreateCourseBatchFailureInviteOnlyWithInvalidMentor",
        COURSE_USER,
        BAD_REQUEST,
    ),
    ScenarioEntry::new(
        "testCreateCourseBatchFailureOpenBatchWithInvalidMentor",
        COURSE_USER,
        BAD_REQUEST,
    ),
    ScenarioEntry::new(
        "testCreateCourseBatchFailureInviteOnlyWithInvalidParticipant",
        COURSE_ORG_USER,
        NOT_FOUND,
    ),
    // successes
    ScenarioEntry::new("testCreateCourseBatchSuccessInviteOnlyBatch", COURSE, OK),
    ScenarioEntry::new("testCreateCourseBatchSuccessOpenBatch", COURSE, OK),
    ScenarioEntry::new("testCreateCourseBatchSuccessInviteOnlyWithCreatedFor", COURSE_ORG, OK),
    ScenarioEntry::new("testCreateCourseBatchSuccessInviteOnlyWithMentors", COURSE_USER, OK),
    ScenarioEntry::new("testCreateCourseBatchSuccessOpenBatchWithMentors", COURSE_USER, OK),
    ScenarioEntry::new(
        "testCreateCourseBatchSuccessInviteOnlyWithParticipants",
        COURSE_ORG_USER,
        OK,
    ),
];
