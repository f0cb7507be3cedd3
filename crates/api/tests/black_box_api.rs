use refhub_infra::config::{AdminBootstrap, AppConfig};
use reqwest::StatusCode;
use serde_json::{json, Value};

const ROOT_EMAIL: &str = "root@refhub.io";
const PASSWORD: &str = "correct-horse";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over the in-memory store, bound to an ephemeral port.
        let config = AppConfig {
            jwt_secret: "test-secret".to_string(),
            bootstrap_admin: Some(AdminBootstrap {
                email: ROOT_EMAIL.to_string(),
                password: PASSWORD.to_string(),
            }),
            ..AppConfig::default()
        };
        let app = refhub_api::app::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, method: reqwest::Method, path: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = self.client.request(method, self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        let text = res.text().await.unwrap();
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        (status, body)
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(reqwest::Method::GET, path, token, None).await
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, path, token, Some(body)).await
    }

    async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::PATCH, path, token, Some(body)).await
    }

    async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .post("/login", None, json!({ "email": email, "password": PASSWORD }))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access"].as_str().unwrap().to_string()
    }

    /// Register and return `(user_id, access_token)`.
    async fn register(&self, role: &str, body: Value) -> (String, String) {
        let (status, body) = self.post(&format!("/register/{role}"), None, body).await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
        (
            body["user"]["id"].as_str().unwrap().to_string(),
            body["access"].as_str().unwrap().to_string(),
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn individual(email: &str) -> Value {
    json!({
        "email": email,
        "password": PASSWORD,
        "first_name": "Ada",
        "last_name": "Obi",
        "gender": "female",
        "phone_number": "+2348000000000",
        "state": "Lagos",
        "city": "Ikeja",
    })
}

fn company(email: &str, registration_number: &str) -> Value {
    json!({
        "email": email,
        "password": PASSWORD,
        "company_name": format!("{registration_number} Ltd"),
        "company_registration_number": registration_number,
    })
}

#[tokio::test]
async fn health_is_public_and_whoami_needs_a_token() {
    let srv = TestServer::spawn().await;

    let (status, _) = srv.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = srv.get("/whoami", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");

    let (status, _) = srv.get("/whoami", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_returns_tokens_for_the_stored_role() {
    let srv = TestServer::spawn().await;
    let (id, token) = srv.register("individual", individual("ada@example.com")).await;

    let (status, body) = srv.get("/whoami", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], id.as_str());
    assert_eq!(body["role"], "individual");
    assert_eq!(body["status"], "pending");
    let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["email", "role", "staff_tier", "status", "user_id"]);

    let (status, body) = srv.get("/accounts/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["profile"]["type"], "individual");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn missing_fields_are_listed_and_nothing_is_stored() {
    let srv = TestServer::spawn().await;
    let mut body = individual("ada@example.com");
    body.as_object_mut().unwrap().remove("gender");

    let (status, resp) = srv.post("/register/individual", None, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "validation_error");
    assert_eq!(resp["fields"], json!(["gender"]));

    let (status, _) = srv
        .post("/login", None, json!({ "email": "ada@example.com", "password": PASSWORD }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let srv = TestServer::spawn().await;
    srv.register("individual", individual("ada@example.com")).await;

    let (status, body) = srv
        .post("/register/company", None, company("Ada@Example.com", "RC999"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn login_ignores_the_declared_role() {
    let srv = TestServer::spawn().await;
    let (id, _) = srv.register("company", company("a@corp.com", "RC123")).await;

    let (status, body) = srv
        .post(
            "/login",
            None,
            json!({ "email": "a@corp.com", "password": PASSWORD, "role": "admin" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], id.as_str());
    assert_eq!(body["role"], "company");
    assert_eq!(body["profile"]["type"], "company");
    assert_eq!(body["profile"]["company_registration_number"], "RC123");

    let (status, body) = srv
        .post("/login", None, json!({ "email": ROOT_EMAIL, "password": PASSWORD }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
    assert!(body["profile"].is_null());

    let (status, body) = srv
        .post("/login", None, json!({ "email": "a@corp.com", "password": "wrong-password" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");
}

#[tokio::test]
async fn company_cannot_patch_another_company_product() {
    let srv = TestServer::spawn().await;
    let (a_id, a) = srv.register("company", company("a@corp.com", "RC123")).await;
    let (_, b) = srv.register("company", company("b@corp.com", "RC456")).await;

    let (status, product) = srv
        .post(
            "/products",
            Some(&a),
            json!({ "name": "Widget", "description": "Shareable", "link": "https://example.com/w" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["company"], a_id.as_str());
    assert_eq!(product["status"], "pending");
    let path = format!("/products/{}", product["id"].as_str().unwrap());

    let (status, body) = srv.patch(&path, Some(&b), json!({ "name": "Hijacked" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = srv.send(reqwest::Method::DELETE, &path, Some(&b), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Product reads are public.
    let (status, stored) = srv.get(&path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored, product);
}

#[tokio::test]
async fn product_counters_above_one_billion_are_rejected() {
    let srv = TestServer::spawn().await;
    let (_, a) = srv.register("company", company("a@corp.com", "RC123")).await;

    let (status, body) = srv
        .post(
            "/products",
            Some(&a),
            json!({
                "name": "Widget",
                "description": "Shareable",
                "link": "https://example.com/w",
                "shares": 1_000_000_001i64,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, products) = srv.get("/products", None).await;
    assert_eq!(products, json!([]));
}

#[tokio::test]
async fn ticket_reads_are_scoped_to_the_submitter() {
    let srv = TestServer::spawn().await;
    let (ada_id, ada) = srv.register("individual", individual("ada@example.com")).await;
    let (_, corp) = srv.register("company", company("a@corp.com", "RC123")).await;
    let admin = srv.login(ROOT_EMAIL).await;

    let (status, ticket) = srv
        .post(
            "/support-tickets",
            Some(&ada),
            json!({ "title": "Payout missing", "description": "Nothing arrived", "submitted_by": "someone-else" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ticket["submitted_by"], ada_id.as_str());
    assert_eq!(ticket["status"], "in-progress");
    let path = format!("/support-tickets/{}", ticket["id"].as_str().unwrap());

    let (_, listed) = srv.get("/support-tickets", Some(&corp)).await;
    assert_eq!(listed, json!([]));
    let (_, listed) = srv.get("/support-tickets", Some(&admin)).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = srv.get(&path, Some(&corp)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, resolved) = srv.post(&format!("{path}/resolve"), Some(&ada), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "resolved");

    let (status, _) = srv.patch(&path, Some(&ada), json!({ "status": "in-progress" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rankings_need_a_login_to_read_and_an_admin_to_write() {
    let srv = TestServer::spawn().await;
    let (_, ada) = srv.register("individual", individual("ada@example.com")).await;
    let admin = srv.login(ROOT_EMAIL).await;
    let ranking = json!({
        "icon": { "file_name": "gold.png", "size_bytes": 2048 },
        "user": "Ada Obi",
        "name": "gold pro",
        "total_recruits": 40,
    });

    let (status, _) = srv.get("/user-rankings", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = srv.post("/user-rankings", Some(&ada), ranking.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = srv.post("/user-rankings", Some(&admin), ranking).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "gold pro");
    assert!(created["icon"].as_str().unwrap().ends_with("-gold.png"));

    let (status, listed) = srv.get("/user-rankings", Some(&ada)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));
}

#[tokio::test]
async fn staff_cannot_grant_the_superadmin_tier_without_being_one() {
    let srv = TestServer::spawn().await;
    let root = srv.login(ROOT_EMAIL).await;

    let (status, ops) = srv
        .post(
            "/staff",
            Some(&root),
            json!({ "email": "ops@refhub.io", "password": PASSWORD, "tier": "admin" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let ops_id = ops["id"].as_str().unwrap().to_string();
    let ops_token = srv.login("ops@refhub.io").await;

    let (status, _) = srv
        .patch(&format!("/staff/{ops_id}"), Some(&ops_token), json!({ "tier": "superadmin" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = srv
        .post(
            "/staff",
            Some(&ops_token),
            json!({ "email": "evil@refhub.io", "password": PASSWORD, "tier": "superadmin" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, ada) = srv.register("individual", individual("ada@example.com")).await;
    let (status, _) = srv.get("/staff", Some(&ada)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deactivated_accounts_lose_access_and_refresh() {
    let srv = TestServer::spawn().await;
    let (status, registered) = srv
        .post("/register/individual", None, individual("ada@example.com"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = registered["user"]["id"].as_str().unwrap();
    let access = registered["access"].as_str().unwrap();
    let refresh = registered["refresh"].as_str().unwrap();

    let (status, body) = srv.post("/token/refresh", None, json!({ "refresh": refresh })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].is_string());

    let (status, _) = srv.post("/token/refresh", None, json!({ "refresh": access })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let admin = srv.login(ROOT_EMAIL).await;
    let (status, body) = srv
        .post(&format!("/accounts/{id}/deactivate"), Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, _) = srv.get("/accounts/me", Some(access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = srv.post("/token/refresh", None, json!({ "refresh": refresh })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn referral_code_credits_the_referrer_wallet() {
    let srv = TestServer::spawn().await;
    let (status, registered) = srv
        .post("/register/individual", None, individual("ada@example.com"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let code = registered["user"]["referral_code"].as_str().unwrap().to_string();
    let ada = registered["access"].as_str().unwrap().to_string();

    let mut referred = individual("bo@example.com");
    referred["referral_code"] = json!(code);
    let (bo_id, _) = srv.register("individual", referred).await;

    let (status, wallet) = srv.get("/wallet", Some(&ada)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(wallet["balance"], 100);

    let (_, referrals) = srv.get("/referrals", Some(&ada)).await;
    assert_eq!(referrals[0]["referred"], bo_id.as_str());

    let mut unknown = individual("cy@example.com");
    unknown["referral_code"] = json!("NOPE0000");
    let (status, _) = srv.post("/register/individual", None, unknown).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn account_administration_is_admin_only() {
    let srv = TestServer::spawn().await;
    let (corp_id, corp) = srv.register("company", company("a@corp.com", "RC123")).await;
    let admin = srv.login(ROOT_EMAIL).await;

    let (status, _) = srv.get("/companies", Some(&corp)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, listed) = srv.get("/companies", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = srv.get("/accounts?role=wizard", Some(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, approved) = srv
        .post(&format!("/accounts/{corp_id}/approve"), Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (status, _) = srv.get("/accounts/not-a-uuid", Some(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bank_lookup_requires_auth_and_a_configured_upstream() {
    let srv = TestServer::spawn().await;
    let (_, ada) = srv.register("individual", individual("ada@example.com")).await;

    let (status, _) = srv
        .get("/verify-account?account_number=0123456789&bank_code=058", None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = srv.get("/verify-account?account_number=0123456789", Some(&ada)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"], json!(["bank_code"]));

    // No BANK_API_BASE_URL in the test config.
    let (status, body) = srv
        .get("/verify-account?account_number=0123456789&bank_code=058", Some(&ada))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["retryable"], false);
}
