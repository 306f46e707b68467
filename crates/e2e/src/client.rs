use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDate};

use lmsprobe_api_client::{ApiClient, HttpExecutor};
use lmsprobe_core::{
    context, FixturePlan, HarnessError, HttpResponse, MatchMode, RenderedRequest, ScenarioFlags,
    TemplateSource, TestContext, Validator,
};
use lmsprobe_runtime_config::HarnessConfig;

use crate::endpoints::{token_path, Endpoint};
use crate::fixtures;

/// Header carrying the end-user token on every service call.
pub const USER_TOKEN_HEADER: &str = "x-authenticated-user-token";

/// Connection info, templates and settings shared by every scenario of a run.
///
/// Holds no per-scenario state: each scenario gets its own [`TestContext`].
pub struct Harness<E> {
    executor: E,
    config: HarnessConfig,
    templates: Box<dyn TemplateSource>,
    validator: Validator,
    today: Option<NaiveDate>,
}

impl Harness<ApiClient> {
    /// Build a harness backed by a real HTTP client.
    pub fn connect(config: HarnessConfig, templates: impl TemplateSource + 'static) -> Result<Self> {
        let client = ApiClient::new(Duration::from_secs(config.service.timeout_secs))?;
        Ok(Self::new(client, config, templates))
    }
}

impl<E: HttpExecutor> Harness<E> {
    pub fn new(executor: E, config: HarnessConfig, templates: impl TemplateSource + 'static) -> Self {
        let mode = if config.validation.strict {
            MatchMode::Strict
        } else {
            MatchMode::Lenient
        };
        Self {
            executor,
            config,
            templates: Box::new(templates),
            validator: Validator::new(mode),
            today: None,
        }
    }

    /// Pin the date used for `today`/`startDate`/`endDate` seeding.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn templates(&self) -> &dyn TemplateSource {
        self.templates.as_ref()
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// A fresh context seeded with the per-scenario defaults.
    pub fn new_context(&self) -> lmsprobe_core::Result<TestContext> {
        let mut ctx = TestContext::new();
        ctx.merge_defaults(context::scenario_defaults(
            self.today(),
            self.config.fixtures.batch_days,
        )?);
        Ok(ctx)
    }

    /// Full URL of `endpoint` for the configured route.
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!(
            "{}{}",
            self.config.service.base_url.trim_end_matches('/'),
            endpoint.path(self.config.service.route)
        )
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}{}",
            self.config.auth_base_url().trim_end_matches('/'),
            token_path(&self.config.auth.realm)
        )
    }

    /// Request skeleton for `endpoint` with the API key and, when given, the user token.
    pub fn api_request(&self, endpoint: Endpoint, token: Option<&str>) -> RenderedRequest {
        self.request_to(endpoint, self.url(endpoint), token)
    }

    pub(crate) fn request_to(
        &self,
        endpoint: Endpoint,
        url: String,
        token: Option<&str>,
    ) -> RenderedRequest {
        let mut req = RenderedRequest::new(endpoint.method(), url);
        if !self.config.service.api_key.is_empty() {
            req = req.header(
                "Authorization",
                format!("Bearer {}", self.config.service.api_key),
            );
        }
        if let Some(token) = token {
            req = req.header(USER_TOKEN_HEADER, token);
        }
        req
    }

    pub async fn send(&self, request: &RenderedRequest) -> lmsprobe_core::Result<HttpResponse> {
        self.executor
            .send(request)
            .await
            .map_err(HarnessError::Transport)
    }

    /// Provision the fixtures `flags` selects into a fresh context.
    ///
    /// Useful for ad-hoc checks outside the catalog.
    pub async fn provision(&self, flags: &ScenarioFlags) -> lmsprobe_core::Result<TestContext> {
        let mut ctx = self.new_context()?;
        for kind in FixturePlan::resolve(flags).steps() {
            fixtures::provision(self, *kind, flags, &mut ctx).await?;
        }
        Ok(ctx)
    }
}
