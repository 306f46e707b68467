//! Fixture providers: each one creates a prerequisite entity through the
//! service API and writes the identifiers it produced into the context.

mod auth;
mod batch;
mod content;
mod enrollment;
mod org;
mod user;

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use lmsprobe_api_client::HttpExecutor;
use lmsprobe_core::{
    BatchPolicy, FixtureKind, HarnessError, RenderedRequest, Result, ScenarioFlags, TestContext,
};

use crate::client::Harness;

pub use auth::issue_token;

/// Provision one fixture kind into `ctx`.
///
/// Fails with `UnmetDependency` before any HTTP call when a required
/// variable is absent.
pub async fn provision<E: HttpExecutor>(
    harness: &Harness<E>,
    kind: FixtureKind,
    flags: &ScenarioFlags,
    ctx: &mut TestContext,
) -> Result<()> {
    kind.spec().check(ctx)?;
    debug!(fixture = %kind, "provisioning");
    match kind {
        FixtureKind::Auth => auth::provision(harness, ctx).await?,
        FixtureKind::Org => org::provision(harness, ctx).await?,
        FixtureKind::User => user::provision(harness, ctx).await?,
        FixtureKind::Content => content::provision(harness, ctx).await?,
        FixtureKind::CourseBatch => {
            let policy = flags.batch.unwrap_or(BatchPolicy::Open);
            batch::provision(harness, ctx, policy).await?
        }
        FixtureKind::Enrollment => enrollment::provision(harness, ctx, flags.enrollment).await?,
    }
    info!(fixture = %kind, "provisioned");
    Ok(())
}

/// Send a fixture call and parse its JSON body.
///
/// Any non-2xx answer, or a 2xx answer that is not JSON, means the fixture
/// could not be provisioned.
async fn call<E: HttpExecutor>(
    harness: &Harness<E>,
    kind: FixtureKind,
    request: &RenderedRequest,
) -> Result<Value> {
    let resp = harness.send(request).await?;
    if !resp.is_success() {
        return Err(HarnessError::FixtureProvisionFailure {
            kind,
            status: resp.status,
            body: resp.body,
        });
    }
    resp.json()
        .ok_or(HarnessError::FixtureProvisionFailure {
            kind,
            status: resp.status,
            body: resp.body,
        })
}

/// String at JSON pointer `pointer`, or `MissingOutput` naming `pointer`.
fn output(kind: FixtureKind, body: &Value, pointer: &str) -> Result<String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| HarnessError::MissingOutput {
            kind,
            field: pointer.trim_start_matches('/').replace('/', "."),
        })
}

/// Wrap `request` in the service's `{"request": ...}` envelope.
fn envelope(request: Value) -> Value {
    serde_json::json!({ "request": request })
}

/// Short random suffix for entity names.
fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_string()
}
