use serde_json::json;

use lmsprobe_api_client::HttpExecutor;
use lmsprobe_core::{vars, EnrollmentState, FixtureKind, Result, TestContext};

use super::{call, envelope};
use crate::client::Harness;
use crate::endpoints::Endpoint;

/// Drive the provisioned user into `state` on the provisioned batch.
pub(super) async fn provision<E: HttpExecutor>(
    harness: &Harness<E>,
    ctx: &mut TestContext,
    state: EnrollmentState,
) -> Result<()> {
    match state {
        EnrollmentState::None => Ok(()),
        EnrollmentState::Enrolled => send(harness, ctx, Endpoint::Enroll).await,
        EnrollmentState::Unenrolled => {
            send(harness, ctx, Endpoint::Enroll).await?;
            send(harness, ctx, Endpoint::Unenroll).await
        }
    }
}

async fn send<E: HttpExecutor>(
    harness: &Harness<E>,
    ctx: &TestContext,
    endpoint: Endpoint,
) -> Result<()> {
    let token = ctx.get_str(vars::USER_AUTH_TOKEN)?;
    let request = harness.api_request(endpoint, Some(token)).json(envelope(json!({
        "courseId": ctx.get_str(vars::COURSE_ID)?,
        "batchId": ctx.get_str(vars::BATCH_ID)?,
        "userId": ctx.get_str(vars::USER_ID)?,
    })));
    call(harness, FixtureKind::Enrollment, &request).await?;
    Ok(())
}
