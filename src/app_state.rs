use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SessionError;
use crate::plan::Plan;
use crate::profile::ProfileForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No plans yet; only the profile form is reachable.
    Empty,
    /// Both plans stored; questions may be asked.
    PlansReady,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanSet {
    pub dietary: Plan,
    pub fitness: Plan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Everything one browser session has produced so far.
#[derive(Debug, Default)]
pub struct SessionState {
    plans: Option<PlanSet>,
    qa_pairs: Vec<QaPair>,
    /// Last submitted form values, re-rendered into the inputs.
    pub form: ProfileForm,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.plans.is_some() {
            Phase::PlansReady
        } else {
            Phase::Empty
        }
    }

    pub fn plans_generated(&self) -> bool {
        self.phase() == Phase::PlansReady
    }

    pub fn plans(&self) -> Option<&PlanSet> {
        self.plans.as_ref()
    }

    pub fn qa_pairs(&self) -> &[QaPair] {
        &self.qa_pairs
    }

    /// Replaces both plans at once and starts a fresh Q&A history.
    pub fn store_plans(&mut self, dietary: Plan, fitness: Plan) {
        self.plans = Some(PlanSet { dietary, fitness });
        self.qa_pairs.clear();
    }

    pub fn push_answer(&mut self, question: String, answer: String) -> Result<(), SessionError> {
        if self.plans.is_none() {
            return Err(SessionError::PlansNotReady);
        }
        self.qa_pairs.push(QaPair { question, answer });
        Ok(())
    }
}

pub type SharedSession = Arc<Mutex<SessionState>>;

struct SessionEntry {
    state: SharedSession,
    last_seen: Instant,
}

/// In-memory sessions keyed by the id stored in the browser's cookie.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns the session for `id`, or a new one (with a new id) when the id
    /// is missing or unknown. The boolean is true for a new session.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, SharedSession, bool) {
        let mut sessions = self.sessions.write().await;

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = Instant::now();
                return (id, entry.state.clone(), false);
            }
        }

        prune_idle(&mut sessions, self.ttl);

        let id = Uuid::new_v4();
        let state = Arc::new(Mutex::new(SessionState::new()));
        sessions.insert(
            id,
            SessionEntry {
                state: state.clone(),
                last_seen: Instant::now(),
            },
        );
        info!(session = %id, active = sessions.len(), "Started new session");
        (id, state, true)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Drops idle sessions nobody is currently holding.
fn prune_idle(sessions: &mut HashMap<Uuid, SessionEntry>, ttl: Duration) {
    let before = sessions.len();
    sessions.retain(|_, entry| {
        entry.last_seen.elapsed() <= ttl || Arc::strong_count(&entry.state) > 1
    });
    let pruned = before - sessions.len();
    if pruned > 0 {
        debug!(pruned, "Pruned idle sessions");
    }
}
