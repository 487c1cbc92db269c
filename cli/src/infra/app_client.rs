//! REST session against a deployed review environment (API v4).

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::application::ports::{AppConnector, AppTeam, AppUser, TargetApp};
use crate::domain::bootstrap::SeedAccount;
use crate::infra::http::{decode, ensure_success, join};

const TOKEN_HEADER: &str = "Token";

/// Opens [`AppClient`] sessions sharing one HTTP client.
pub struct AppHttpConnector {
    http: Client,
}

impl AppHttpConnector {
    #[must_use]
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

impl AppConnector for AppHttpConnector {
    type App = AppClient;

    fn connect(&self, base_url: &str) -> Result<AppClient> {
        let url = Url::parse(base_url).with_context(|| format!("invalid server URL {base_url}"))?;
        Ok(AppClient {
            http: self.http.clone(),
            api: join(url.as_str(), "/api/v4"),
            token: None,
        })
    }
}

pub struct AppClient {
    http: Client,
    api: String,
    token: Option<String>,
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PingResponse {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct UserJson {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct TeamJson {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct NewUser<'a> {
    email: &'a str,
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Login<'a> {
    login_id: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct NewTeam<'a> {
    name: &'a str,
    display_name: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Serialize)]
struct TeamMember<'a> {
    team_id: &'a str,
    user_id: &'a str,
}

// ── Session ─────────────────────────────────────────────────────────────────

impl AppClient {
    fn url(&self, path: &str) -> String {
        join(&self.api, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

impl TargetApp for AppClient {
    async fn ping(&self) -> Result<bool> {
        let resp = self
            .http
            .get(self.url("/system/ping"))
            .send()
            .await
            .context("pinging server")?;
        let ping: PingResponse = decode(resp, "ping").await?;
        Ok(ping.status.eq_ignore_ascii_case("OK"))
    }

    async fn create_user(&self, account: &SeedAccount) -> Result<AppUser> {
        let body = NewUser {
            email: account.email,
            username: account.username,
            password: account.password,
        };
        let resp = self
            .authed(self.http.post(self.url("/users")))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("creating user {}", account.username))?;
        let user: UserJson = decode(resp, "user").await?;
        Ok(AppUser {
            id: user.id,
            username: user.username,
        })
    }

    async fn login(&mut self, username: &str, password: &str) -> Result<AppUser> {
        let resp = self
            .http
            .post(self.url("/users/login"))
            .json(&Login {
                login_id: username,
                password,
            })
            .send()
            .await
            .with_context(|| format!("logging in as {username}"))?;
        let resp = ensure_success(resp, "login").await?;
        let token = resp
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .context("login response carried no session token")?;
        let user: UserJson = decode(resp, "user").await?;
        self.token = Some(token);
        debug!(%username, "logged in");
        Ok(AppUser {
            id: user.id,
            username: user.username,
        })
    }

    async fn create_team(&self, name: &str, display_name: &str) -> Result<AppTeam> {
        let body = NewTeam {
            name,
            display_name,
            kind: "O",
        };
        let resp = self
            .authed(self.http.post(self.url("/teams")))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("creating team {name}"))?;
        let team: TeamJson = decode(resp, "team").await?;
        Ok(AppTeam {
            id: team.id,
            name: team.name,
        })
    }

    async fn add_team_member(&self, team_id: &str, user_id: &str) -> Result<()> {
        let resp = self
            .authed(self.http.post(self.url(&format!("/teams/{team_id}/members"))))
            .json(&TeamMember { team_id, user_id })
            .send()
            .await
            .with_context(|| format!("adding {user_id} to team {team_id}"))?;
        ensure_success(resp, "add team member").await?;
        Ok(())
    }

    async fn get_config(&self) -> Result<Value> {
        let resp = self
            .authed(self.http.get(self.url("/config")))
            .send()
            .await
            .context("reading server config")?;
        decode(resp, "server config").await
    }

    async fn update_config(&self, config: &Value) -> Result<()> {
        let resp = self
            .authed(self.http.put(self.url("/config")))
            .json(config)
            .send()
            .await
            .context("updating server config")?;
        ensure_success(resp, "update config").await?;
        Ok(())
    }
}
