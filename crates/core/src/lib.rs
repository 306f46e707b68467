pub mod context;
pub mod error;
pub mod fixture;
pub mod request;
pub mod template;
pub mod validate;

pub use context::{vars, TestContext};
pub use error::{HarnessError, Result, TransportError};
pub use fixture::{BatchPolicy, EnrollmentState, FixtureKind, FixturePlan, FixtureSpec, ScenarioFlags};
pub use request::{HttpMethod, HttpResponse, RenderedRequest, RequestBody};
pub use template::{DirTemplates, RenderedPair, StaticTemplates, Template, TemplatePair, TemplateSource};
pub use validate::{BodyDiff, ExpectedResponse, MatchMode, Mismatch, ValidationResult, Validator};
