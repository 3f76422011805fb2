#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use uuid::Uuid;

use projecthub_api::auth::hash_password;
use projecthub_api::config;
use projecthub_api::database::DatabaseManager;
use projecthub_api::services::NewUser;
use projecthub_api::state::AppState;
use projecthub_api::types::Role;

pub const PASSWORD: &str = "correct horse battery";

/// A signed-in account created for one test
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// In-process server on a free port plus the rows a test created, so they
/// can be removed afterwards.
pub struct TestContext {
    pub base_url: String,
    pub client: reqwest::Client,
    pub state: AppState,
    users: Vec<Uuid>,
    teams: Vec<Uuid>,
}

impl TestContext {
    /// `None` when DATABASE_URL is not set; the caller should return early
    pub async fn start() -> Result<Option<Self>> {
        if std::env::var("DATABASE_URL").is_err() {
            eprintln!("DATABASE_URL not set; skipping database test");
            return Ok(None);
        }

        let pool = DatabaseManager::connect(config::config()).await?;
        DatabaseManager::migrate(&pool).await?;
        let state = AppState::new(pool);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let app = projecthub_api::app(state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("test server stopped: {e}");
            }
        });

        Ok(Some(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            state,
            users: Vec::new(),
            teams: Vec::new(),
        }))
    }

    pub fn unique(prefix: &str) -> String {
        format!("{}-{}", prefix, Uuid::new_v4().simple())
    }

    /// Approved account with `role`, already logged in
    pub async fn create_user(&mut self, role: Role) -> Result<TestUser> {
        let email = format!("{}@example.com", Self::unique(role.as_str()));
        let user = self
            .state
            .users()
            .create_approved(
                NewUser {
                    name: format!("Test {}", role),
                    email: email.clone(),
                    password_hash: hash_password(PASSWORD)?,
                },
                role,
            )
            .await?;
        self.users.push(user.id);

        let token = self.login(&email, PASSWORD).await?;
        Ok(TestUser {
            id: user.id,
            email,
            token,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body = res.json::<Value>().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response without token")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str, user: &TestUser) -> RequestBuilder {
        self.client.request(method, self.url(path)).bearer_auth(&user.token)
    }

    pub fn track_user(&mut self, id: Uuid) {
        self.users.push(id);
    }

    pub fn track_team(&mut self, id: Uuid) {
        self.teams.push(id);
    }

    /// Create a team through the API and remember it for cleanup
    pub async fn create_team(&mut self, owner: &TestUser) -> Result<Value> {
        let res = self
            .request(Method::POST, "/api/teams", owner)
            .json(&serde_json::json!({ "name": Self::unique("team") }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "team create failed: {}", res.status());

        let team = res.json::<Value>().await?["data"].clone();
        self.track_team(id_of(&team)?);
        Ok(team)
    }

    /// Teams first (cascading their projects), then the users
    pub async fn cleanup(self) {
        for id in &self.teams {
            let _ = self.state.teams().delete_cascade(*id).await;
        }
        for id in &self.users {
            let _ = self.state.users().delete(*id).await;
        }
    }
}

pub fn id_of(value: &Value) -> Result<Uuid> {
    let raw = value["id"].as_str().context("value without id")?;
    Ok(raw.parse()?)
}
