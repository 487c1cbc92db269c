//! Environment bootstrap: seeded accounts, step manifest, configuration
//! profile.
//!
//! Pure functions only. The application service drives the remote calls.

use std::fmt;

use serde_json::{Map, Value, json};

/// An account seeded into every fresh environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedAccount {
    pub username: &'static str,
    pub email: &'static str,
    pub password: &'static str,
}

pub const ADMIN_ACCOUNT: SeedAccount = SeedAccount {
    username: "sysadmin",
    email: "sysadmin@example.mattermost.com",
    password: "Sys@dmin123",
};

pub const TEST_ACCOUNT: SeedAccount = SeedAccount {
    username: "user-1",
    email: "user-1@example.mattermost.com",
    password: "User-1@123",
};

/// Name (and display name) of the default team.
#[must_use]
pub fn team_name(pr_number: u64) -> String {
    format!("pr{pr_number}")
}

/// Markdown table of the seeded accounts, posted with the success comment.
#[must_use]
pub fn accounts_table() -> String {
    format!(
        "| Account Type | Username | Password |\n|---|---|---|\n| Admin | {} | {} |\n| User | {} | {} |",
        ADMIN_ACCOUNT.username,
        ADMIN_ACCOUNT.password,
        TEST_ACCOUNT.username,
        TEST_ACCOUNT.password
    )
}

// ── Step manifest ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStep {
    CreateAdmin,
    Login,
    CreateTeam,
    AddAdminToTeam,
    CreateTestUser,
    AddTestUserToTeam,
    ReadConfig,
    UpdateConfig,
}

impl BootstrapStep {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CreateAdmin => "create-admin",
            Self::Login => "login",
            Self::CreateTeam => "create-team",
            Self::AddAdminToTeam => "add-admin-to-team",
            Self::CreateTestUser => "create-test-user",
            Self::AddTestUserToTeam => "add-test-user-to-team",
            Self::ReadConfig => "read-config",
            Self::UpdateConfig => "update-config",
        }
    }

    /// Steps without which nothing later can run.
    #[must_use]
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::CreateAdmin | Self::Login)
    }
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    Failed { fatal: bool, error: String },
    /// A prerequisite step failed.
    Skipped,
}

/// Which bootstrap steps ran and how they ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub steps: Vec<(BootstrapStep, StepStatus)>,
}

impl BootstrapReport {
    pub fn succeeded(&mut self, step: BootstrapStep) {
        self.steps.push((step, StepStatus::Succeeded));
    }

    pub fn failed(&mut self, step: BootstrapStep, error: impl fmt::Display) {
        self.steps.push((
            step,
            StepStatus::Failed {
                fatal: step.is_fatal(),
                error: error.to_string(),
            },
        ));
    }

    pub fn skipped(&mut self, step: BootstrapStep) {
        self.steps.push((step, StepStatus::Skipped));
    }

    #[must_use]
    pub fn status(&self, step: BootstrapStep) -> Option<&StepStatus> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, st)| st)
    }

    /// First fatal failure, if any.
    #[must_use]
    pub fn fatal_failure(&self) -> Option<(BootstrapStep, &str)> {
        self.steps.iter().find_map(|(step, status)| match status {
            StepStatus::Failed { fatal: true, error } => Some((*step, error.as_str())),
            _ => None,
        })
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.steps
            .iter()
            .all(|(_, status)| *status == StepStatus::Succeeded)
    }
}

// ── Configuration profile ────────────────────────────────────────────────────

/// Outbound email relay credentials applied to every environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EmailRelay {
    pub username: String,
    pub password: String,
    pub server: String,
}

impl fmt::Debug for EmailRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailRelay")
            .field("username", &self.username)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

/// Apply the fixed review-environment profile to the application's config.
///
/// Open registration, developer/experimental flags, the email relay and a
/// public test directory service. Unrelated settings are left untouched.
pub fn apply_profile(config: &mut Value, relay: &EmailRelay) {
    let settings = [
        ("TeamSettings", "EnableOpenServer", json!(true)),
        ("TeamSettings", "ExperimentalViewArchivedChannels", json!(true)),
        ("PluginSettings", "EnableUploads", json!(true)),
        ("ServiceSettings", "EnableTesting", json!(true)),
        ("ServiceSettings", "ExperimentalLdapGroupSync", json!(true)),
        ("ServiceSettings", "EnableDeveloper", json!(true)),
        ("LogSettings", "FileLevel", json!("INFO")),
        ("EmailSettings", "FeedbackName", json!("SpinWick Feedback")),
        ("EmailSettings", "FeedbackEmail", json!("feedback@mattermost.com")),
        ("EmailSettings", "ReplyToAddress", json!("feedback@mattermost.com")),
        ("EmailSettings", "SMTPUsername", json!(relay.username)),
        ("EmailSettings", "SMTPPassword", json!(relay.password)),
        ("EmailSettings", "SMTPServer", json!(relay.server)),
        ("EmailSettings", "SMTPPort", json!("465")),
        ("EmailSettings", "EnableSMTPAuth", json!(true)),
        ("EmailSettings", "ConnectionSecurity", json!("TLS")),
        ("EmailSettings", "SendEmailNotifications", json!(true)),
        ("LdapSettings", "Enable", json!(true)),
        ("LdapSettings", "EnableSync", json!(true)),
        ("LdapSettings", "LdapServer", json!("ldap.forumsys.com")),
        ("LdapSettings", "BaseDN", json!("dc=example,dc=com")),
        ("LdapSettings", "BindUsername", json!("cn=read-only-admin,dc=example,dc=com")),
        ("LdapSettings", "BindPassword", json!("password")),
        ("LdapSettings", "GroupDisplayNameAttribute", json!("cn")),
        ("LdapSettings", "GroupIdAttribute", json!("entryUUID")),
        ("LdapSettings", "EmailAttribute", json!("mail")),
        ("LdapSettings", "UsernameAttribute", json!("uid")),
        ("LdapSettings", "IdAttribute", json!("uid")),
        ("LdapSettings", "LoginIdAttribute", json!("uid")),
    ];
    for (section, key, value) in settings {
        set(config, section, key, value);
    }
}

fn set(config: &mut Value, section: &str, key: &str, value: Value) {
    if !config.is_object() {
        *config = Value::Object(Map::new());
    }
    let Value::Object(root) = config else { return };
    let entry = root
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(map) = entry {
        map.insert(key.to_string(), value);
    }
}
