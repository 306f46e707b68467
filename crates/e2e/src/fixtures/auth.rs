use lmsprobe_api_client::HttpExecutor;
use lmsprobe_core::{vars, FixtureKind, RenderedRequest, Result, TestContext};

use super::{call, output};
use crate::client::Harness;

/// Exchange a username and password for an access token.
///
/// `kind` names the fixture a failure is attributed to.
pub async fn issue_token<E: HttpExecutor>(
    harness: &Harness<E>,
    kind: FixtureKind,
    username: &str,
    password: &str,
) -> Result<String> {
    let auth = &harness.config().auth;
    let request = RenderedRequest::post(harness.token_url()).form([
        ("client_id", auth.client_id.as_str()),
        ("grant_type", "password"),
        ("username", username),
        ("password", password),
    ]);
    let body = call(harness, kind, &request).await?;
    output(kind, &body, "/access_token")
}

pub(super) async fn provision<E: HttpExecutor>(
    harness: &Harness<E>,
    ctx: &mut TestContext,
) -> Result<()> {
    let auth = &harness.config().auth;
    let token = issue_token(harness, FixtureKind::Auth, &auth.username, &auth.password).await?;
    ctx.set(vars::ACCESS_TOKEN, token);
    Ok(())
}
