use serde_json::json;

use lmsprobe_api_client::HttpExecutor;
use lmsprobe_core::{vars, FixtureKind, Result, TestContext};

use super::{call, envelope, issue_token, output, unique_suffix};
use crate::client::Harness;
use crate::endpoints::Endpoint;

const KIND: FixtureKind = FixtureKind::User;

/// Create a fresh user and log in as them.
pub(super) async fn provision<E: HttpExecutor>(
    harness: &Harness<E>,
    ctx: &mut TestContext,
) -> Result<()> {
    let token = ctx.get_str(vars::ACCESS_TOKEN)?.to_string();
    let password = harness.config().fixtures.user_password.clone();
    let suffix = unique_suffix();
    let user_name = format!("ft_user_{suffix}");

    let mut user = json!({
        "firstName": "FT",
        "lastName": format!("User {suffix}"),
        "userName": user_name,
        "email": format!("{user_name}@ft.example.org"),
        "emailVerified": true,
        "password": password,
    });
    if let Some(channel) = ctx.lookup(vars::ROOT_ORG_CHANNEL) {
        user["channel"] = channel.clone();
    }

    let request = harness
        .api_request(Endpoint::UserCreate, Some(&token))
        .json(envelope(user));
    let body = call(harness, KIND, &request).await?;
    let user_id = output(KIND, &body, "/result/userId")?;

    let user_token = issue_token(harness, KIND, &user_name, &password).await?;

    ctx.set(vars::USER_ID, user_id);
    ctx.set(vars::USER_NAME, user_name);
    ctx.set(vars::USER_AUTH_TOKEN, user_token);
    Ok(())
}
