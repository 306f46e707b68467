use serde_json::json;
use tracing::{debug, warn};

use lmsprobe_api_client::HttpExecutor;
use lmsprobe_core::{vars, FixtureKind, Result, TestContext};

use super::{call, envelope, output};
use crate::client::Harness;
use crate::endpoints::Endpoint;

const KIND: FixtureKind = FixtureKind::Org;

/// Find the configured root org by channel, creating it when absent.
///
/// Concurrent scenarios may race to create the same org; a failed create is
/// followed by one more search before giving up.
pub(super) async fn provision<E: HttpExecutor>(
    harness: &Harness<E>,
    ctx: &mut TestContext,
) -> Result<()> {
    let token = ctx.get_str(vars::ACCESS_TOKEN)?.to_string();
    let channel = harness.config().fixtures.root_org_channel.clone();

    let org_id = match search(harness, &token, &channel).await? {
        Some(id) => id,
        None => match create(harness, &token, &channel).await {
            Ok(id) => id,
            Err(create_err) => {
                warn!(channel = %channel, error = %create_err, "org create failed, searching again");
                search(harness, &token, &channel).await?.ok_or(create_err)?
            }
        },
    };

    ctx.set(vars::ROOT_ORG_CHANNEL, channel);
    ctx.set(vars::ORGANISATION_ID, org_id);
    Ok(())
}

async fn search<E: HttpExecutor>(
    harness: &Harness<E>,
    token: &str,
    channel: &str,
) -> Result<Option<String>> {
    let request = harness
        .api_request(Endpoint::OrgSearch, Some(token))
        .json(envelope(json!({
            "filters": { "channel": channel, "isRootOrg": true },
            "limit": 1,
        })));
    let body = call(harness, KIND, &request).await?;
    let found = body
        .pointer("/result/response/content/0/id")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    debug!(channel, found = found.is_some(), "org search");
    Ok(found)
}

async fn create<E: HttpExecutor>(harness: &Harness<E>, token: &str, channel: &str) -> Result<String> {
    let name = &harness.config().fixtures.root_org_name;
    let request = harness
        .api_request(Endpoint::OrgCreate, Some(token))
        .json(envelope(json!({
            "orgName": name,
            "channel": channel,
            "isRootOrg": true,
            "description": "Root org for functional tests",
        })));
    let body = call(harness, KIND, &request).await?;
    output(KIND, &body, "/result/organisationId")
}
