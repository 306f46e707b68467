//! Runs the catalog against a deployed platform configured through the
//! `LMSPROBE_*` environment variables:
//!
//! ```sh
//! LMSPROBE_BASE_URL=https://staging.example.org cargo test -p lmsprobe-e2e --test live -- --ignored
//! ```

use std::sync::Arc;

use lmsprobe_api_client::ApiClient;
use lmsprobe_core::DirTemplates;
use lmsprobe_e2e::{run_suites, specs, Harness};
use lmsprobe_runtime_config::{apply_env_overrides, HarnessConfig};

fn live_harness() -> Arc<Harness<ApiClient>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut config = HarnessConfig::default();
    apply_env_overrides(&mut config);
    let templates = DirTemplates::new(lmsprobe_e2e::bundled_templates_dir());
    Arc::new(Harness::connect(config, templates).expect("failed to build HTTP client"))
}

macro_rules! live_suite {
    ($name:ident, $suite:path) => {
        #[tokio::test]
        #[ignore = "needs a running platform"]
        async fn $name() {
            let report = run_suites(live_harness(), &[&$suite], None, true).await;
            let failed: Vec<String> = report
                .results
                .iter()
                .filter_map(|r| Some(format!("{}: {}", r.qualified_name(), r.error()?)))
                .collect();
            assert!(failed.is_empty(), "{}", failed.join("\n"));
        }
    };
}

live_suite!(create_batch, specs::course_batch::SUITE);
live_suite!(enroll, specs::enroll::SUITE);
live_suite!(unenroll, specs::unenroll::SUITE);
