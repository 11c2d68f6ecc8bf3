//! Scripted mock implementations for all service ports
//!
//! Each mock replays a queue of scripted responses and records every call, so
//! tests can assert both on the dispatcher's results and on the exact
//! sequence of remote calls it issued. Mocks are cheap to clone and clones
//! share state, which lets a test keep a handle after moving the mock into an
//! `Arc<dyn Trait>`.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use requester_core::{
    models::{ConfirmedAssignment, PendingRequest, TeamId, TeamRecord},
    traits::{AssignmentClient, GeneratorTrigger, RequestSource, TeamDirectory},
    RequesterError, RequesterResult,
};

/// Shared, ordered log of remote calls across several mocks
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == entry)
            .count()
    }
}

type Hook = Arc<dyn Fn(usize) + Send + Sync>;

/// Mock implementation of TeamDirectory for testing
///
/// Scripted availability responses are returned in order; once the script is
/// exhausted every further call returns the fallback team list.
#[derive(Clone)]
pub struct MockTeamDirectory {
    script: Arc<Mutex<VecDeque<Result<Vec<TeamId>, String>>>>,
    fallback: Arc<Mutex<Vec<TeamId>>>,
    stats: Arc<Mutex<Result<Vec<TeamRecord>, String>>>,
    available_calls: Arc<Mutex<usize>>,
    stats_calls: Arc<Mutex<usize>>,
    on_available: Arc<Mutex<Option<Hook>>>,
    log: CallLog,
}

impl MockTeamDirectory {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(Vec::new())),
            stats: Arc::new(Mutex::new(Ok(Vec::new()))),
            available_calls: Arc::new(Mutex::new(0)),
            stats_calls: Arc::new(Mutex::new(0)),
            on_available: Arc::new(Mutex::new(None)),
            log: CallLog::new(),
        }
    }

    /// Always report the same set of idle teams
    pub fn with_teams(teams: Vec<TeamId>) -> Self {
        let directory = Self::new();
        *directory.fallback.lock().unwrap() = teams;
        directory
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn push_teams(&self, teams: Vec<TeamId>) {
        self.script.lock().unwrap().push_back(Ok(teams));
    }

    pub fn push_failure(&self, message: &str) {
        self.script.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn set_fallback(&self, teams: Vec<TeamId>) {
        *self.fallback.lock().unwrap() = teams;
    }

    pub fn set_stats(&self, teams: Vec<TeamRecord>) {
        *self.stats.lock().unwrap() = Ok(teams);
    }

    pub fn fail_stats(&self, message: &str) {
        *self.stats.lock().unwrap() = Err(message.to_string());
    }

    /// Run a callback on every availability query, receiving the 1-based call number
    pub fn on_available_teams(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.on_available.lock().unwrap() = Some(Arc::new(hook));
    }

    pub fn available_calls(&self) -> usize {
        *self.available_calls.lock().unwrap()
    }

    pub fn stats_calls(&self) -> usize {
        *self.stats_calls.lock().unwrap()
    }
}

impl Default for MockTeamDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TeamDirectory for MockTeamDirectory {
    async fn available_teams(&self) -> RequesterResult<Vec<TeamId>> {
        let call = {
            let mut calls = self.available_calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        self.log.record("available_teams");

        let hook = self.on_available.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(call);
        }

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(teams)) => Ok(teams),
            Some(Err(message)) => Err(RequesterError::transport("cleaner", message)),
            None => Ok(self.fallback.lock().unwrap().clone()),
        }
    }

    async fn teams_stats(&self) -> RequesterResult<Vec<TeamRecord>> {
        *self.stats_calls.lock().unwrap() += 1;
        self.log.record("teams_stats");

        match &*self.stats.lock().unwrap() {
            Ok(teams) => Ok(teams.clone()),
            Err(message) => Err(RequesterError::transport("cleaner", message)),
        }
    }
}

/// Mock implementation of RequestSource for testing
///
/// Pops scripted entries in order and reports "no pending request" once the
/// script is exhausted.
#[derive(Clone, Default)]
pub struct MockRequestSource {
    script: Arc<Mutex<VecDeque<Result<Option<PendingRequest>, String>>>>,
    calls: Arc<Mutex<usize>>,
    on_pop: Arc<Mutex<Option<Hook>>>,
    log: CallLog,
}

impl MockRequestSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_requests(requests: Vec<PendingRequest>) -> Self {
        let source = Self::new();
        for request in requests {
            source.push_request(request);
        }
        source
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn push_request(&self, request: PendingRequest) {
        self.script.lock().unwrap().push_back(Ok(Some(request)));
    }

    pub fn push_empty(&self) {
        self.script.lock().unwrap().push_back(Ok(None));
    }

    pub fn push_failure(&self, message: &str) {
        self.script.lock().unwrap().push_back(Err(message.to_string()));
    }

    /// Run a callback while a pop is in flight, receiving the 1-based call number
    pub fn on_pop_top(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.on_pop.lock().unwrap() = Some(Arc::new(hook));
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl RequestSource for MockRequestSource {
    async fn pop_top(&self) -> RequesterResult<Option<PendingRequest>> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        self.log.record("pop_top");

        let hook = self.on_pop.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(call);
        }

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(request)) => Ok(request),
            Some(Err(message)) => Err(RequesterError::transport("buffer", message)),
            None => Ok(None),
        }
    }
}

/// Mock implementation of AssignmentClient for testing
///
/// Every team accepts unless it was marked as rejecting. Confirmations echo
/// the request's id and priority with a configurable time in cleaner.
#[derive(Clone)]
pub struct MockAssignmentClient {
    rejecting: Arc<Mutex<HashSet<TeamId>>>,
    time_in_cleaner: Arc<Mutex<HashMap<TeamId, f64>>>,
    default_time_in_cleaner: f64,
    attempts: Arc<Mutex<Vec<(u64, TeamId)>>>,
    on_attempt: Arc<Mutex<Option<Arc<dyn Fn(TeamId) + Send + Sync>>>>,
    log: CallLog,
}

impl MockAssignmentClient {
    pub fn new() -> Self {
        Self {
            rejecting: Arc::new(Mutex::new(HashSet::new())),
            time_in_cleaner: Arc::new(Mutex::new(HashMap::new())),
            default_time_in_cleaner: 1.5,
            attempts: Arc::new(Mutex::new(Vec::new())),
            on_attempt: Arc::new(Mutex::new(None)),
            log: CallLog::new(),
        }
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn reject_team(&self, team_id: TeamId) {
        self.rejecting.lock().unwrap().insert(team_id);
    }

    pub fn accept_team(&self, team_id: TeamId) {
        self.rejecting.lock().unwrap().remove(&team_id);
    }

    pub fn set_time_in_cleaner(&self, team_id: TeamId, seconds: f64) {
        self.time_in_cleaner.lock().unwrap().insert(team_id, seconds);
    }

    /// Run a callback while an assignment is in flight, receiving the team id
    pub fn on_proceed_cleaning(&self, hook: impl Fn(TeamId) + Send + Sync + 'static) {
        *self.on_attempt.lock().unwrap() = Some(Arc::new(hook));
    }

    /// All (request id, team id) pairs offered so far, in order
    pub fn attempts(&self) -> Vec<(u64, TeamId)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempted_teams(&self) -> Vec<TeamId> {
        self.attempts().into_iter().map(|(_, team)| team).collect()
    }
}

impl Default for MockAssignmentClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssignmentClient for MockAssignmentClient {
    async fn proceed_cleaning(
        &self,
        request: &PendingRequest,
        team_id: TeamId,
    ) -> RequesterResult<ConfirmedAssignment> {
        self.attempts.lock().unwrap().push((request.id, team_id));
        self.log.record(format!("proceed_cleaning:{team_id}"));

        let hook = self.on_attempt.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(team_id);
        }

        if self.rejecting.lock().unwrap().contains(&team_id) {
            return Err(RequesterError::ServiceStatus {
                service: "cleaner".to_string(),
                status: 409,
                body: format!("team {team_id} is busy"),
            });
        }

        let time_in_cleaner = self
            .time_in_cleaner
            .lock()
            .unwrap()
            .get(&team_id)
            .copied()
            .unwrap_or(self.default_time_in_cleaner);

        Ok(ConfirmedAssignment {
            request_id: request.id,
            team_id,
            priority: request.priority,
            time_in_cleaner,
        })
    }
}

/// Mock implementation of GeneratorTrigger for testing
#[derive(Debug, Clone, Default)]
pub struct MockGeneratorTrigger {
    fail_with: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockGeneratorTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        let generator = Self::new();
        *generator.fail_with.lock().unwrap() = Some(message.to_string());
        generator
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl GeneratorTrigger for MockGeneratorTrigger {
    async fn start_generator(&self) -> RequesterResult<()> {
        *self.calls.lock().unwrap() += 1;

        match &*self.fail_with.lock().unwrap() {
            Some(message) => Err(RequesterError::transport("generator", message)),
            None => Ok(()),
        }
    }
}
