use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::mail::{Mailer, MemoryMailer};
use crate::motivation::{CannedMotivator, Motivator};
use crate::store::{MemoryStore, Store};

/// Everything a handler needs, built once at startup and shared by all workers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
    pub mailer: Arc<dyn Mailer>,
    pub motivator: Arc<dyn Motivator>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: TokenService,
        hasher: PasswordHasher,
        mailer: Arc<dyn Mailer>,
        motivator: Arc<dyn Motivator>,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            mailer,
            motivator,
        }
    }

    /// A self-contained state: memory store, recording mailer, silent motivator
    /// and the cheapest bcrypt cost.
    pub fn in_memory(tokens: TokenService) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            tokens,
            PasswordHasher::new(4),
            Arc::new(MemoryMailer::new()),
            Arc::new(CannedMotivator::silent()),
        )
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn with_motivator(mut self, motivator: Arc<dyn Motivator>) -> Self {
        self.motivator = motivator;
        self
    }
}
