use serde_json::{json, Value};

use lmsprobe_api_client::HttpExecutor;
use lmsprobe_core::{vars, FixtureKind, Result, TestContext};

use super::{call, envelope, output, unique_suffix};
use crate::client::Harness;
use crate::endpoints::Endpoint;

const KIND: FixtureKind = FixtureKind::Content;
const COLLECTION_MIME: &str = "application/vnd.ekstep.content-collection";

/// Create a course with one unit holding the configured resource, then publish it.
pub(super) async fn provision<E: HttpExecutor>(
    harness: &Harness<E>,
    ctx: &mut TestContext,
) -> Result<()> {
    let token = ctx.get_str(vars::ACCESS_TOKEN)?.to_string();
    let resource_id = match ctx.lookup(vars::RESOURCE_ID).and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => harness.config().fixtures.resource_id.clone(),
    };
    let suffix = unique_suffix();

    let create = harness
        .api_request(Endpoint::ContentCreate, Some(&token))
        .json(envelope(json!({
            "content": {
                "name": format!("FT Course {suffix}"),
                "code": format!("ft_course_{suffix}"),
                "description": "Course for functional tests",
                "mimeType": COLLECTION_MIME,
                "contentType": "Course",
            }
        })));
    let body = call(harness, KIND, &create).await?;
    let course_id = output(KIND, &body, "/result/node_id")
        .or_else(|_| output(KIND, &body, "/result/identifier"))?;

    let unit_id = add_unit(harness, &token, &course_id, &resource_id, &suffix).await?;

    let publish_url = format!(
        "{}/{}",
        harness.url(Endpoint::ContentPublish),
        urlencoding::encode(&course_id)
    );
    let publish = harness
        .request_to(Endpoint::ContentPublish, publish_url, Some(&token))
        .json(envelope(json!({
            "content": { "lastPublishedBy": harness.config().auth.username }
        })));
    call(harness, KIND, &publish).await?;

    ctx.set(vars::COURSE_UNIT_ID, unit_id);
    ctx.set(vars::RESOURCE_ID, resource_id);
    ctx.set(vars::COURSE_ID, course_id);
    Ok(())
}

/// Attach a new unit to the course hierarchy.
///
/// New nodes carry a client-chosen id; the service answers with the id it
/// assigned, which wins when present.
async fn add_unit<E: HttpExecutor>(
    harness: &Harness<E>,
    token: &str,
    course_id: &str,
    resource_id: &str,
    suffix: &str,
) -> Result<String> {
    let temp_id = format!("ft_unit_{suffix}");
    let mut modified = serde_json::Map::new();
    modified.insert(
        temp_id.clone(),
        json!({
            "isNew": true,
            "root": false,
            "metadata": {
                "name": "FT Unit",
                "mimeType": COLLECTION_MIME,
                "contentType": "CourseUnit",
            }
        }),
    );
    let mut hierarchy = serde_json::Map::new();
    hierarchy.insert(
        course_id.to_string(),
        json!({ "contentType": "Course", "children": [temp_id], "root": true }),
    );
    hierarchy.insert(
        temp_id.clone(),
        json!({ "contentType": "CourseUnit", "children": [resource_id], "root": false }),
    );

    let request = harness
        .api_request(Endpoint::HierarchyUpdate, Some(token))
        .json(envelope(json!({
            "data": { "nodesModified": modified, "hierarchy": hierarchy }
        })));
    let body = call(harness, KIND, &request).await?;

    let assigned = body
        .pointer("/result/identifiers")
        .and_then(|ids| ids.get(&temp_id))
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(assigned.unwrap_or(temp_id))
}
