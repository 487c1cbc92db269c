//! Shared test helpers for the workflow service tests.
//!
//! [`FakeBackend`] implements every port from a [`Script`]: answers are
//! consumed in order and the last one repeats. Calls are journalled against
//! the tokio clock, so tests running with `start_paused` can assert both the
//! order of remote calls and when they happened.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde_json::{Value, json};
use spinwick_common::{
    Cluster, ClusterState, CreateClusterRequest, CreateInstallationRequest, Installation,
    InstallationRecord, InstallationState, PullRequestRef,
};
use tokio::time::Instant;

use crate::application::ports::{
    AppConnector, AppTeam, AppUser, BuildStatusSource, ClusterApi, ImageRegistry,
    InstallationApi, InstallationRecordStore, JenkinsApi, Notifier, PullRequestStore,
    ReachabilityProbe, TargetApp, UpgradeResponse,
};
use crate::domain::bootstrap::SeedAccount;
use crate::domain::build::{CheckRun, CommitStatus, JenkinsBuild, JenkinsJob};
use crate::domain::config::JenkinsServer;
use crate::domain::{CiMechanism, RepositoryConfig, SpinwickConfig};

pub const CONTEXT: &str = "ci/build";
pub const JOB_LINK: &str =
    "https://build.example.com/job/mp/job/mattermost-server/job/PR-42/7/display/redirect";

// ── Scripts ───────────────────────────────────────────────────────────────────

/// Ordered answers for one port method. The last answer repeats forever.
pub struct Script<T> {
    answers: VecDeque<Result<T, String>>,
}

impl<T: Clone> Script<T> {
    pub fn of(answers: impl IntoIterator<Item = Result<T, &'static str>>) -> Self {
        Self {
            answers: answers
                .into_iter()
                .map(|a| a.map_err(str::to_string))
                .collect(),
        }
    }

    pub fn always(value: T) -> Self {
        Self::of([Ok(value)])
    }

    pub fn failing(message: &'static str) -> Self {
        Self::of([Err(message)])
    }

    fn next(&mut self, what: &str) -> Result<T> {
        let answer = if self.answers.len() > 1 {
            self.answers.pop_front()
        } else {
            self.answers.front().cloned()
        };
        match answer {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(anyhow!(message)),
            None => bail!("no scripted answer for {what}"),
        }
    }
}

// ── Journal ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CommitStatuses(String),
    CheckRuns(String),
    JenkinsBuild(String),
    ManifestLookup(String),
    CreateCluster(String),
    GetCluster(String),
    CreateInstallation(CreateInstallationRequest),
    GetInstallation(String),
    Upgrade(String),
    DeleteInstallation(String),
    Reachability(String),
    Connect(String),
    Ping,
    CreateUser(String),
    Login(String),
    CreateTeam(String),
    AddTeamMember(String),
    GetConfig,
    UpdateConfig,
    Comment(String),
    SaveRecord(u64),
    DeleteRecord(u64),
    SavePullRequest(String),
}

pub struct FakeState {
    pub records: HashMap<u64, InstallationRecord>,
    pub pull_requests: HashMap<u64, PullRequestRef>,
    pub statuses: Script<Vec<CommitStatus>>,
    pub check_runs: Script<Vec<CheckRun>>,
    pub jenkins: Script<JenkinsBuild>,
    pub manifests: Script<Option<String>>,
    pub create_cluster: Script<String>,
    pub clusters: Script<ClusterState>,
    pub create_installation: Script<String>,
    pub installations: Script<InstallationState>,
    pub upgrades: Script<UpgradeResponse>,
    pub delete_installation: Script<()>,
    pub delete_record: Script<()>,
    pub reachable: Script<bool>,
    pub ping: Script<bool>,
    /// App calls that fail, e.g. `login`, `create_user:user-1`,
    /// `add_team_member:id-sysadmin`.
    pub failing_app_calls: HashSet<String>,
    pub app_config: Value,
    pub journal: Vec<(Instant, Call)>,
}

impl FakeState {
    fn log(&mut self, call: Call) {
        self.journal.push((Instant::now(), call));
    }

    fn fail_if(&self, key: &str) -> Result<()> {
        if self.failing_app_calls.contains(key) {
            bail!("{key} refused");
        }
        Ok(())
    }
}

// ── Fake backend ──────────────────────────────────────────────────────────────

/// Happy-path backend: green build, published image, stable cluster and
/// installation, healthy application. Tests override single scripts.
#[derive(Clone)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
    start: Instant,
}

impl FakeBackend {
    pub fn new() -> Self {
        let state = FakeState {
            records: HashMap::new(),
            pull_requests: HashMap::new(),
            statuses: Script::always(statuses("success")),
            check_runs: Script::always(check_runs("completed", Some("success"))),
            jenkins: Script::always(jenkins(false, Some("SUCCESS"))),
            manifests: Script::always(Some("sha256:feed".to_string())),
            create_cluster: Script::always("cluster-1".to_string()),
            clusters: Script::always(ClusterState::Stable),
            create_installation: Script::always("inst-1".to_string()),
            installations: Script::always(InstallationState::Stable),
            upgrades: Script::always(UpgradeResponse::Accepted),
            delete_installation: Script::always(()),
            delete_record: Script::always(()),
            reachable: Script::always(true),
            ping: Script::always(true),
            failing_app_calls: HashSet::new(),
            app_config: json!({ "TeamSettings": { "SiteName": "Review" } }),
            journal: Vec::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            start: Instant::now(),
        }
    }

    pub fn with(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.state());
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state lock")
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().journal.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn comments(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Comment(body) => Some(body),
                _ => None,
            })
            .collect()
    }

    /// Time since construction of the first call matching `pred`.
    pub fn first_at(&self, pred: impl Fn(&Call) -> bool) -> Option<Duration> {
        self.state()
            .journal
            .iter()
            .find(|(_, c)| pred(c))
            .map(|(at, _)| *at - self.start)
    }

    /// Time since construction of the last call matching `pred`.
    pub fn last_at(&self, pred: impl Fn(&Call) -> bool) -> Option<Duration> {
        self.state()
            .journal
            .iter()
            .rev()
            .find(|(_, c)| pred(c))
            .map(|(at, _)| *at - self.start)
    }

    /// Position of the first call matching `pred` in the journal.
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(pred)
    }
}

impl InstallationRecordStore for FakeBackend {
    async fn get_record(&self, number: u64) -> Result<Option<InstallationRecord>> {
        Ok(self.state().records.get(&number).cloned())
    }

    async fn save_record(&self, record: &InstallationRecord) -> Result<()> {
        let mut s = self.state();
        s.log(Call::SaveRecord(record.number));
        s.records.insert(record.number, record.clone());
        Ok(())
    }

    async fn delete_record(&self, number: u64) -> Result<()> {
        let mut s = self.state();
        s.log(Call::DeleteRecord(number));
        s.delete_record.next("delete_record")?;
        s.records.remove(&number);
        Ok(())
    }
}

impl PullRequestStore for FakeBackend {
    async fn get_pull_request(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
    ) -> Result<Option<PullRequestRef>> {
        Ok(self.state().pull_requests.get(&number).cloned())
    }

    async fn save_pull_request(&self, pr: &PullRequestRef) -> Result<()> {
        let mut s = self.state();
        s.log(Call::SavePullRequest(pr.sha.clone()));
        s.pull_requests.insert(pr.number, pr.clone());
        Ok(())
    }
}

impl BuildStatusSource for FakeBackend {
    async fn commit_statuses(
        &self,
        _owner: &str,
        _repo: &str,
        sha: &str,
    ) -> Result<Vec<CommitStatus>> {
        let mut s = self.state();
        s.log(Call::CommitStatuses(sha.to_string()));
        s.statuses.next("commit_statuses")
    }

    async fn check_runs(&self, _owner: &str, _repo: &str, sha: &str) -> Result<Vec<CheckRun>> {
        let mut s = self.state();
        s.log(Call::CheckRuns(sha.to_string()));
        s.check_runs.next("check_runs")
    }
}

impl JenkinsApi for FakeBackend {
    async fn jenkins_build(&self, _server: &str, job: &JenkinsJob) -> Result<JenkinsBuild> {
        let mut s = self.state();
        s.log(Call::JenkinsBuild(format!("{}/{}", job.path, job.build_number)));
        s.jenkins.next("jenkins_build")
    }
}

impl ImageRegistry for FakeBackend {
    async fn manifest_digest(&self, _image: &str, tag: &str) -> Result<Option<String>> {
        let mut s = self.state();
        s.log(Call::ManifestLookup(tag.to_string()));
        s.manifests.next("manifest_digest")
    }
}

impl ClusterApi for FakeBackend {
    async fn create_cluster(&self, request: &CreateClusterRequest) -> Result<Cluster> {
        let mut s = self.state();
        s.log(Call::CreateCluster(request.size.clone()));
        let id = s.create_cluster.next("create_cluster")?;
        Ok(Cluster {
            id,
            size: request.size.clone(),
            state: ClusterState::CreationRequested,
            ..Cluster::default()
        })
    }

    async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster> {
        let mut s = self.state();
        s.log(Call::GetCluster(cluster_id.to_string()));
        let state = s.clusters.next("get_cluster")?;
        Ok(Cluster {
            id: cluster_id.to_string(),
            state,
            ..Cluster::default()
        })
    }
}

impl InstallationApi for FakeBackend {
    async fn create_installation(
        &self,
        request: &CreateInstallationRequest,
    ) -> Result<Installation> {
        let mut s = self.state();
        s.log(Call::CreateInstallation(request.clone()));
        let id = s.create_installation.next("create_installation")?;
        Ok(Installation {
            id,
            owner_id: request.owner_id.clone(),
            version: request.version.clone(),
            dns: request.dns.clone(),
            size: request.size.clone(),
            affinity: request.affinity.clone(),
            state: InstallationState::CreationRequested,
            create_at: 0,
        })
    }

    async fn get_installation(&self, installation_id: &str) -> Result<Installation> {
        let mut s = self.state();
        s.log(Call::GetInstallation(installation_id.to_string()));
        let state = s.installations.next("get_installation")?;
        Ok(Installation {
            id: installation_id.to_string(),
            state,
            ..Installation::default()
        })
    }

    async fn upgrade_installation(
        &self,
        _installation_id: &str,
        version: &str,
    ) -> Result<UpgradeResponse> {
        let mut s = self.state();
        s.log(Call::Upgrade(version.to_string()));
        s.upgrades.next("upgrade_installation")
    }

    async fn delete_installation(&self, installation_id: &str) -> Result<()> {
        let mut s = self.state();
        s.log(Call::DeleteInstallation(installation_id.to_string()));
        s.delete_installation.next("delete_installation")
    }
}

impl ReachabilityProbe for FakeBackend {
    async fn check_tcp_connectivity(&self, host: &str, port: u16) -> Result<bool> {
        let mut s = self.state();
        s.log(Call::Reachability(format!("{host}:{port}")));
        s.reachable.next("check_tcp_connectivity")
    }
}

impl Notifier for FakeBackend {
    async fn post_comment(&self, _pr: &PullRequestRef, body: &str) -> Result<()> {
        self.state().log(Call::Comment(body.to_string()));
        Ok(())
    }
}

impl AppConnector for FakeBackend {
    type App = FakeApp;

    fn connect(&self, base_url: &str) -> Result<FakeApp> {
        self.state().log(Call::Connect(base_url.to_string()));
        Ok(FakeApp {
            state: Arc::clone(&self.state),
            token: None,
        })
    }
}

/// Session handed out by [`FakeBackend::connect`]; shares the journal.
pub struct FakeApp {
    state: Arc<Mutex<FakeState>>,
    token: Option<String>,
}

impl FakeApp {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state lock")
    }

    fn require_login(&self) -> Result<()> {
        if self.token.is_none() {
            bail!("401 unauthenticated");
        }
        Ok(())
    }
}

impl TargetApp for FakeApp {
    async fn ping(&self) -> Result<bool> {
        let mut s = self.state();
        s.log(Call::Ping);
        s.ping.next("ping")
    }

    async fn create_user(&self, account: &SeedAccount) -> Result<AppUser> {
        let mut s = self.state();
        s.log(Call::CreateUser(account.username.to_string()));
        s.fail_if(&format!("create_user:{}", account.username))?;
        Ok(AppUser {
            id: format!("id-{}", account.username),
            username: account.username.to_string(),
        })
    }

    async fn login(&mut self, username: &str, _password: &str) -> Result<AppUser> {
        {
            let mut s = self.state();
            s.log(Call::Login(username.to_string()));
            s.fail_if("login")?;
        }
        self.token = Some("session-token".to_string());
        Ok(AppUser {
            id: format!("id-{username}"),
            username: username.to_string(),
        })
    }

    async fn create_team(&self, name: &str, _display_name: &str) -> Result<AppTeam> {
        self.require_login()?;
        let mut s = self.state();
        s.log(Call::CreateTeam(name.to_string()));
        s.fail_if("create_team")?;
        Ok(AppTeam {
            id: format!("team-{name}"),
            name: name.to_string(),
        })
    }

    async fn add_team_member(&self, _team_id: &str, user_id: &str) -> Result<()> {
        self.require_login()?;
        let mut s = self.state();
        s.log(Call::AddTeamMember(user_id.to_string()));
        s.fail_if(&format!("add_team_member:{user_id}"))
    }

    async fn get_config(&self) -> Result<Value> {
        self.require_login()?;
        let mut s = self.state();
        s.log(Call::GetConfig);
        s.fail_if("get_config")?;
        Ok(s.app_config.clone())
    }

    async fn update_config(&self, config: &Value) -> Result<()> {
        self.require_login()?;
        let mut s = self.state();
        s.log(Call::UpdateConfig);
        s.fail_if("update_config")?;
        s.app_config = config.clone();
        Ok(())
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn pull_request() -> PullRequestRef {
    PullRequestRef {
        repo_owner: "mattermost".to_string(),
        repo_name: "mattermost-server".to_string(),
        number: 42,
        sha: "abc1234def5678".to_string(),
        branch: "feature-x".to_string(),
        labels: vec!["Setup Cloud Test Server".to_string()],
        build_link: None,
    }
}

pub fn config(ci: CiMechanism) -> SpinwickConfig {
    let mut config = SpinwickConfig::default();
    config.repositories = vec![RepositoryConfig {
        owner: "mattermost".to_string(),
        name: "mattermost-server".to_string(),
        build_status_context: CONTEXT.to_string(),
        ci,
        image: "mattermost/mattermost-enterprise-edition".to_string(),
    }];
    config.jenkins_servers.insert(
        "build".to_string(),
        JenkinsServer {
            url: "https://build.example.com".to_string(),
        },
    );
    config
}

pub fn statuses(state: &str) -> Vec<CommitStatus> {
    vec![CommitStatus {
        context: CONTEXT.to_string(),
        state: state.to_string(),
        target_url: Some(JOB_LINK.to_string()),
    }]
}

pub fn check_runs(status: &str, conclusion: Option<&str>) -> Vec<CheckRun> {
    vec![CheckRun {
        name: CONTEXT.to_string(),
        status: status.to_string(),
        conclusion: conclusion.map(str::to_string),
        html_url: Some("https://github.com/mattermost/mattermost-server/runs/1".to_string()),
    }]
}

pub fn jenkins(building: bool, result: Option<&str>) -> JenkinsBuild {
    JenkinsBuild {
        number: 7,
        building,
        result: result.map(str::to_string),
    }
}
