use lmsprobe_core::HttpMethod;
use lmsprobe_runtime_config::RouteMode;

/// Service endpoints the harness calls, each with a gateway and a direct path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    OrgSearch,
    OrgCreate,
    UserCreate,
    ContentCreate,
    HierarchyUpdate,
    /// Takes the content id as a trailing path segment.
    ContentPublish,
    BatchCreate,
    Enroll,
    Unenroll,
}

impl Endpoint {
    pub fn path(self, route: RouteMode) -> &'static str {
        use Endpoint::*;
        use RouteMode::{Gateway, Lms};
        match (self, route) {
            (OrgSearch, Gateway) => "/api/org/v1/search",
            (OrgSearch, Lms) => "/v1/org/search",
            (OrgCreate, Gateway) => "/api/org/v1/create",
            (OrgCreate, Lms) => "/v1/org/create",
            (UserCreate, Gateway) => "/api/user/v1/create",
            (UserCreate, Lms) => "/v1/user/create",
            (ContentCreate, Gateway) => "/api/content/v1/create",
            (ContentCreate, Lms) => "/v1/content/create",
            (HierarchyUpdate, Gateway) => "/api/course/v1/hierarchy/update",
            (HierarchyUpdate, Lms) => "/v1/course/hierarchy/update",
            (ContentPublish, Gateway) => "/api/content/v1/publish",
            (ContentPublish, Lms) => "/v1/content/publish",
            (BatchCreate, Gateway) => "/api/course/v1/batch/create",
            (BatchCreate, Lms) => "/v1/course/batch/create",
            (Enroll, Gateway) => "/api/course/v1/enrol",
            (Enroll, Lms) => "/v1/course/enroll",
            (Unenroll, Gateway) => "/api/course/v1/unenrol",
            (Unenroll, Lms) => "/v1/course/unenroll",
        }
    }

    pub fn method(self) -> HttpMethod {
        match self {
            Self::HierarchyUpdate => HttpMethod::Patch,
            _ => HttpMethod::Post,
        }
    }
}

/// Password-grant token path of the identity provider.
pub fn token_path(realm: &str) -> String {
    format!("/auth/realms/{realm}/protocol/openid-connect/token")
}
