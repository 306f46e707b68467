use serde_json::{json, Value};

use lmsprobe_api_client::HttpExecutor;
use lmsprobe_core::{vars, BatchPolicy, FixtureKind, Result, TestContext};

use super::{call, envelope, output, unique_suffix};
use crate::client::Harness;
use crate::endpoints::Endpoint;

const KIND: FixtureKind = FixtureKind::CourseBatch;

pub(super) async fn provision<E: HttpExecutor>(
    harness: &Harness<E>,
    ctx: &mut TestContext,
    policy: BatchPolicy,
) -> Result<()> {
    let token = ctx.get_str(vars::ACCESS_TOKEN)?.to_string();
    let course_id = ctx.get_str(vars::COURSE_ID)?.to_string();
    let start_date = match ctx.lookup(vars::START_DATE).and_then(Value::as_str) {
        Some(date) => date.to_string(),
        None => harness.today().format("%Y-%m-%d").to_string(),
    };

    let mut batch = json!({
        "courseId": course_id,
        "name": format!("FT Batch {}", unique_suffix()),
        "description": "Batch for functional tests",
        "enrollmentType": policy.enrollment_type(),
        "startDate": start_date,
    });
    if let Some(org_id) = ctx.lookup(vars::ORGANISATION_ID) {
        batch["createdFor"] = json!([org_id]);
    }

    let request = harness
        .api_request(Endpoint::BatchCreate, Some(&token))
        .json(envelope(batch));
    let body = call(harness, KIND, &request).await?;
    let batch_id = output(KIND, &body, "/result/batchId")?;

    ctx.set(vars::BATCH_ID, batch_id);
    Ok(())
}
