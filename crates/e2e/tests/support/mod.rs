//! In-process stand-in for the learning platform, enforcing the same
//! validation rules the catalog scenarios probe.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::NaiveDate;
use serde_json::{json, Value};

use lmsprobe_api_client::HttpExecutor;
use lmsprobe_core::{HttpMethod, HttpResponse, RenderedRequest, RequestBody, TransportError};
use lmsprobe_runtime_config::HarnessConfig;

pub const BASE_URL: &str = "http://fake.lms";
pub const API_KEY: &str = "ft-api-key";
pub const ADMIN_USER: &str = "ft-admin";
pub const ADMIN_PASSWORD: &str = "ft-admin-pass";

pub const TOKEN_PATH: &str = "/auth/realms/sunbird/protocol/openid-connect/token";
pub const ORG_SEARCH: &str = "/api/org/v1/search";
pub const ORG_CREATE: &str = "/api/org/v1/create";
pub const USER_CREATE: &str = "/api/user/v1/create";
pub const CONTENT_CREATE: &str = "/api/content/v1/create";
pub const HIERARCHY_UPDATE: &str = "/api/course/v1/hierarchy/update";
pub const CONTENT_PUBLISH: &str = "/api/content/v1/publish";
pub const BATCH_CREATE: &str = "/api/course/v1/batch/create";
pub const ENROLL: &str = "/api/course/v1/enrol";
pub const UNENROLL: &str = "/api/course/v1/unenrol";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

pub fn config() -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.service.base_url = BASE_URL.into();
    config.service.api_key = API_KEY.into();
    config.auth.username = ADMIN_USER.into();
    config.auth.password = ADMIN_PASSWORD.into();
    config
}

#[derive(Debug, Clone)]
pub struct Call {
    pub method: HttpMethod,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Principal {
    Admin,
    User(String),
}

#[derive(Debug, Clone)]
struct Batch {
    course_id: String,
    invite_only: bool,
}

#[derive(Default)]
struct State {
    next_id: u64,
    tokens: HashMap<String, Principal>,
    /// userName -> (userId, password)
    users: HashMap<String, (String, String)>,
    /// channel -> org id
    orgs: HashMap<String, String>,
    /// course id -> published
    courses: HashMap<String, bool>,
    batches: HashMap<String, Batch>,
    /// (userId, batchId) -> active
    enrollments: HashMap<(String, String), bool>,
    calls: Vec<Call>,
    hide_next_org_search: bool,
    unreachable: HashSet<String>,
    failing: HashMap<String, u16>,
}

impl State {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{:04}", self.next_id)
    }

    fn user_ids(&self) -> HashSet<&str> {
        self.users.values().map(|(id, _)| id.as_str()).collect()
    }
}

pub struct FakeLms {
    state: Mutex<State>,
    today: NaiveDate,
}

impl FakeLms {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            today: today(),
        }
    }

    /// Answer `path` with a bare `status` regardless of the request.
    pub fn fail_path(&self, path: &str, status: u16) {
        self.state.lock().unwrap().failing.insert(path.into(), status);
    }

    /// Calls to `path` never get a response.
    pub fn unreachable(&self, path: &str) {
        self.state.lock().unwrap().unreachable.insert(path.into());
    }

    /// Register a root org without going through the API.
    pub fn seed_org(&self, channel: &str) -> String {
        let mut st = self.state.lock().unwrap();
        let id = st.id("org");
        st.orgs.insert(channel.into(), id.clone());
        id
    }

    /// The next org search finds nothing, as if another client created the
    /// org right after it.
    pub fn hide_next_org_search(&self) {
        self.state.lock().unwrap().hide_next_org_search = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|c| c.path == path).count()
    }

    fn route(&self, st: &mut State, request: &RenderedRequest, path: &str) -> HttpResponse {
        if path == TOKEN_PATH {
            return token(st, request);
        }
        let api_key = format!("Bearer {API_KEY}");
        if request.header_value("authorization") != Some(api_key.as_str()) {
            return HttpResponse::new(401, json!({"message": "Unauthorized"}).to_string());
        }
        let principal = request
            .header_value("x-authenticated-user-token")
            .and_then(|t| st.tokens.get(t).cloned());
        let body = request
            .json_body()
            .and_then(|b| b.get("request"))
            .cloned()
            .unwrap_or_else(|| json!({}));

        match path {
            ORG_SEARCH => org_search(st, &body),
            ORG_CREATE => org_create(st, &body, principal),
            USER_CREATE => user_create(st, &body, principal),
            CONTENT_CREATE => content_create(st, &body, principal),
            HIERARCHY_UPDATE => hierarchy_update(st, &body),
            BATCH_CREATE => batch_create(st, &body, principal, self.today),
            ENROLL => enrollment(st, &body, principal, true),
            UNENROLL => enrollment(st, &body, principal, false),
            p if p.starts_with(CONTENT_PUBLISH) => {
                publish(st, p.trim_start_matches(CONTENT_PUBLISH).trim_start_matches('/'))
            }
            _ => HttpResponse::new(404, "no route"),
        }
    }
}

impl HttpExecutor for FakeLms {
    async fn send(&self, request: &RenderedRequest) -> Result<HttpResponse, TransportError> {
        let raw = request.url.strip_prefix(BASE_URL).unwrap_or(&request.url);
        let path = canonical(raw);

        let mut st = self.state.lock().unwrap();
        st.calls.push(Call {
            method: request.method,
            path: path.clone(),
        });
        if st.unreachable.contains(&path) {
            return Err(TransportError {
                method: request.method.to_string(),
                url: request.url.clone(),
                reason: "connection refused".into(),
                timed_out: false,
            });
        }
        if let Some(status) = st.failing.get(&path) {
            return Ok(HttpResponse::new(*status, "injected failure"));
        }
        Ok(self.route(&mut st, request, &path))
    }
}

/// Map direct service paths onto their gateway equivalents.
fn canonical(path: &str) -> String {
    const DIRECT: &[(&str, &str)] = &[
        ("/v1/org/search", ORG_SEARCH),
        ("/v1/org/create", ORG_CREATE),
        ("/v1/user/create", USER_CREATE),
        ("/v1/content/create", CONTENT_CREATE),
        ("/v1/course/hierarchy/update", HIERARCHY_UPDATE),
        ("/v1/course/batch/create", BATCH_CREATE),
        ("/v1/course/enroll", ENROLL),
        ("/v1/course/unenroll", UNENROLL),
    ];
    if let Some(id) = path.strip_prefix("/v1/content/publish") {
        return format!("{CONTENT_PUBLISH}{id}");
    }
    DIRECT
        .iter()
        .find(|(direct, _)| *direct == path)
        .map(|(_, gateway)| gateway.to_string())
        .unwrap_or_else(|| path.to_string())
}

fn ok(api: &str, result: Value) -> HttpResponse {
    let body = json!({
        "id": api,
        "ver": "v1",
        "ts": "2026-10-17 09:30:00:000+0000",
        "params": {
            "resmsgid": "0f2c6a1e-resmsg",
            "msgid": null,
            "err": null,
            "status": "success",
            "errmsg": null,
        },
        "responseCode": "OK",
        "result": result,
    });
    HttpResponse::new(200, body.to_string())
}

fn fail(status: u16, api: &str, code: &str, message: &str) -> HttpResponse {
    let response_code = match status {
        401 => "UNAUTHORIZED",
        404 => "RESOURCE_NOT_FOUND",
        _ => "CLIENT_ERROR",
    };
    let body = json!({
        "id": api,
        "ver": "v1",
        "ts": "2026-10-17 09:30:00:000+0000",
        "params": {
            "resmsgid": "0f2c6a1e-resmsg",
            "msgid": null,
            "err": code,
            "status": code,
            "errmsg": message,
        },
        "responseCode": response_code,
        "result": {},
    });
    HttpResponse::new(status, body.to_string())
}

fn str_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn str_list(body: &Value, key: &str) -> Vec<String> {
    body.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn token(st: &mut State, request: &RenderedRequest) -> HttpResponse {
    let RequestBody::Form(pairs) = &request.body else {
        return HttpResponse::new(400, json!({"error": "invalid_request"}).to_string());
    };
    let field = |name: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    };
    let (username, password) = (field("username"), field("password"));

    let principal = if username == ADMIN_USER && password == ADMIN_PASSWORD {
        Some(Principal::Admin)
    } else {
        st.users
            .get(&username)
            .filter(|(_, pw)| *pw == password)
            .map(|(id, _)| Principal::User(id.clone()))
    };
    match principal {
        Some(principal) => {
            let token = st.id("token");
            st.tokens.insert(token.clone(), principal);
            HttpResponse::new(
                200,
                json!({"access_token": token, "token_type": "bearer", "expires_in": 300})
                    .to_string(),
            )
        }
        None => HttpResponse::new(401, json!({"error": "invalid_grant"}).to_string()),
    }
}

fn org_search(st: &mut State, body: &Value) -> HttpResponse {
    let channel = body
        .pointer("/filters/channel")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let hidden = std::mem::take(&mut st.hide_next_org_search);
    let content: Vec<Value> = match st.orgs.get(channel) {
        Some(id) if !hidden => vec![json!({"id": id, "channel": channel, "isRootOrg": true})],
        _ => Vec::new(),
    };
    ok(
        "api.org.search",
        json!({"response": {"count": content.len(), "content": content}}),
    )
}

fn org_create(st: &mut State, body: &Value, principal: Option<Principal>) -> HttpResponse {
    const API: &str = "api.org.create";
    if principal != Some(Principal::Admin) {
        return fail(401, API, "UNAUTHORIZED_USER", "You are not authorized.");
    }
    let Some(channel) = str_field(body, "channel") else {
        return fail(400, API, "MANDATORY_PARAMETER_MISSING", "Mandatory parameter channel is missing.");
    };
    if st.orgs.contains_key(channel) {
        return fail(400, API, "CHANNEL_UNIQUE", "Channel value already used by another org.");
    }
    let id = st.id("org");
    st.orgs.insert(channel.to_string(), id.clone());
    ok(API, json!({"organisationId": id, "response": "SUCCESS"}))
}

fn user_create(st: &mut State, body: &Value, principal: Option<Principal>) -> HttpResponse {
    const API: &str = "api.user.create";
    if principal != Some(Principal::Admin) {
        return fail(401, API, "UNAUTHORIZED_USER", "You are not authorized.");
    }
    let (Some(user_name), Some(password)) = (str_field(body, "userName"), str_field(body, "password"))
    else {
        return fail(400, API, "MANDATORY_PARAMETER_MISSING", "Mandatory parameter userName is missing.");
    };
    if st.users.contains_key(user_name) {
        return fail(400, API, "USERNAME_EXISTS", "Username already exists.");
    }
    let id = st.id("user");
    st.users
        .insert(user_name.to_string(), (id.clone(), password.to_string()));
    ok(API, json!({"userId": id, "response": "SUCCESS"}))
}

fn content_create(st: &mut State, body: &Value, principal: Option<Principal>) -> HttpResponse {
    const API: &str = "api.content.create";
    if principal.is_none() {
        return fail(401, API, "UNAUTHORIZED_USER", "You are not authorized.");
    }
    if body.pointer("/content/contentType").and_then(Value::as_str) != Some("Course") {
        return fail(400, API, "ERR_CONTENT_INVALID_OBJECT", "Only courses are supported.");
    }
    let id = st.id("do_course");
    st.courses.insert(id.clone(), false);
    ok(API, json!({"node_id": id, "identifier": id, "versionKey": "1760693400000"}))
}

fn hierarchy_update(st: &mut State, body: &Value) -> HttpResponse {
    const API: &str = "api.content.hierarchy.update";
    let hierarchy = body
        .pointer("/data/hierarchy")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let Some(course_id) = hierarchy.keys().find(|k| st.courses.contains_key(*k)).cloned() else {
        return fail(400, API, "ERR_INVALID_ROOT_ID", "Root node is not a known course.");
    };
    let new_nodes: Vec<String> = body
        .pointer("/data/nodesModified")
        .and_then(Value::as_object)
        .map(|nodes| {
            nodes
                .iter()
                .filter(|(_, node)| node["isNew"] == json!(true))
                .map(|(temp, _)| temp.clone())
                .collect()
        })
        .unwrap_or_default();
    let mut identifiers = serde_json::Map::new();
    for temp in new_nodes {
        identifiers.insert(temp, Value::String(st.id("do_unit")));
    }
    ok(API, json!({"content_id": course_id, "identifiers": identifiers}))
}

fn publish(st: &mut State, course_id: &str) -> HttpResponse {
    const API: &str = "api.content.publish";
    match st.courses.get_mut(course_id) {
        Some(published) => {
            *published = true;
            ok(API, json!({"node_id": course_id, "publishStatus": "Publish Operation Started"}))
        }
        None => fail(404, API, "RESOURCE_NOT_FOUND", "Content not found."),
    }
}

fn batch_create(
    st: &mut State,
    body: &Value,
    principal: Option<Principal>,
    today: NaiveDate,
) -> HttpResponse {
    const API: &str = "api.course.batch.create";
    if principal.is_none() {
        return fail(401, API, "UNAUTHORIZED_USER", "You are not authorized.");
    }
    for key in ["courseId", "name", "enrollmentType", "startDate"] {
        if str_field(body, key).is_none() {
            return fail(400, API, "MANDATORY_PARAMETER_MISSING", &format!("Mandatory parameter {key} is missing."));
        }
    }
    let invite_only = match str_field(body, "enrollmentType") {
        Some("open") => false,
        Some("invite-only") => true,
        _ => return fail(400, API, "INVALID_PARAMETER_VALUE", "Invalid enrollmentType."),
    };
    let date = |key: &str| {
        str_field(body, key).map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
    };
    let start = match date("startDate") {
        Some(Ok(d)) if d >= today => d,
        _ => return fail(400, API, "COURSE_BATCH_START_DATE_INVALID", "Batch start date should be either today or future date."),
    };
    match date("endDate") {
        None => {}
        Some(Ok(end)) if end >= today && end >= start => {}
        _ => return fail(400, API, "END_DATE_ERROR", "End date should be greater than start date."),
    }

    let Some(course_id) = str_field(body, "courseId").map(str::to_string) else {
        return fail(400, API, "MANDATORY_PARAMETER_MISSING", "Mandatory parameter courseId is missing.");
    };
    if st.courses.get(&course_id) != Some(&true) {
        return fail(400, API, "INVALID_COURSE_ID", "Please provide valid courseId.");
    }
    let org_ids: HashSet<&str> = st.orgs.values().map(String::as_str).collect();
    if str_list(body, "createdFor").iter().any(|id| !org_ids.contains(id.as_str())) {
        return fail(400, API, "INVALID_ORGANIZATION_ID", "Given organization ID is invalid.");
    }
    let user_ids = st.user_ids();
    if str_list(body, "mentors").iter().any(|id| !user_ids.contains(id.as_str())) {
        return fail(400, API, "INVALID_USER_ID", "Invalid user id.");
    }
    if str_list(body, "participants").iter().any(|id| !user_ids.contains(id.as_str())) {
        return fail(404, API, "USER_NOT_FOUND", "User not found.");
    }

    let id = st.id("batch");
    st.batches.insert(
        id.clone(),
        Batch {
            course_id,
            invite_only,
        },
    );
    ok(API, json!({"response": "SUCCESS", "batchId": id}))
}

fn enrollment(st: &mut State, body: &Value, principal: Option<Principal>, enroll: bool) -> HttpResponse {
    let api = if enroll {
        "api.course.enroll"
    } else {
        "api.course.unenroll"
    };
    let Some(principal) = principal else {
        return fail(401, api, "UNAUTHORIZED_USER", "You are not authorized.");
    };
    let (Some(course_id), Some(batch_id), Some(user_id)) = (
        str_field(body, "courseId"),
        str_field(body, "batchId"),
        str_field(body, "userId"),
    ) else {
        return fail(400, api, "MANDATORY_PARAMETER_MISSING", "Mandatory parameter is missing.");
    };
    if let Principal::User(caller) = &principal {
        if caller != user_id {
            return fail(401, api, "UNAUTHORIZED_USER", "You are not authorized.");
        }
    }
    let Some(batch) = st.batches.get(batch_id) else {
        return fail(400, api, "INVALID_COURSE_BATCH_ID", "Invalid course batch id.");
    };
    if batch.course_id != course_id {
        return fail(400, api, "INVALID_COURSE_ID", "Please provide valid courseId.");
    }
    if batch.invite_only {
        return fail(400, api, "ENROLLMENT_TYPE_VALIDATION", "Invite-only batches do not allow self enrollment.");
    }

    let key = (user_id.to_string(), batch_id.to_string());
    let current = st.enrollments.get(&key).copied();
    match (enroll, current) {
        (true, Some(true)) => fail(400, api, "USER_ALREADY_ENROLLED_COURSE", "User has already enrolled this course."),
        (true, _) => {
            st.enrollments.insert(key, true);
            ok(api, json!({"response": "SUCCESS"}))
        }
        (false, None) => fail(400, api, "USER_NOT_ENROLLED_COURSE", "User is not enrolled in this course."),
        (false, Some(false)) => fail(400, api, "USER_ALREADY_UNENROLLED_COURSE", "User has already unenrolled this course."),
        (false, Some(true)) => {
            st.enrollments.insert(key, false);
            ok(api, json!({"response": "SUCCESS"}))
        }
    }
}
