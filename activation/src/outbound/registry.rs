//! In-memory activation registry for the reference backend.
//!
//! Records live in a mutex-guarded map. `claim` checks and updates under one
//! lock, so concurrent claimants on an active code race to exactly one winner.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{ActivationRegistry, ActivationRegistryError};
use crate::domain::{ActivationCode, ActivationCodeRecord, CodeState, UserId};

/// Registry adapter holding every issued code in memory.
pub struct InMemoryActivationRegistry {
    records: Mutex<HashMap<ActivationCode, CodeState>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryActivationRegistry {
    /// Empty registry stamping claims with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Registry seeded with freshly issued `codes`.
    pub fn with_codes(
        clock: Arc<dyn Clock>,
        codes: impl IntoIterator<Item = ActivationCode>,
    ) -> Self {
        let registry = Self::new(clock);
        for code in codes {
            registry.issue(code);
        }
        registry
    }

    /// Issue `code` as active. Returns `false` when it already exists, in
    /// which case the existing record is left untouched.
    pub fn issue(&self, code: ActivationCode) -> bool {
        let mut records = self.lock_records();
        if records.contains_key(&code) {
            return false;
        }
        records.insert(code, CodeState::Active);
        true
    }

    /// Number of issued codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    /// Whether no codes have been issued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_records().is_empty()
    }

    fn lock_records(&self) -> MutexGuard<'_, HashMap<ActivationCode, CodeState>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ActivationRegistry for InMemoryActivationRegistry {
    async fn find(
        &self,
        code: &ActivationCode,
    ) -> Result<Option<ActivationCodeRecord>, ActivationRegistryError> {
        Ok(self
            .lock_records()
            .get(code)
            .map(|state| ActivationCodeRecord {
                code: code.clone(),
                state: state.clone(),
            }))
    }

    async fn claim(
        &self,
        code: &ActivationCode,
        owner: &UserId,
    ) -> Result<ActivationCodeRecord, ActivationRegistryError> {
        let mut records = self.lock_records();
        let state = records
            .get_mut(code)
            .ok_or_else(|| ActivationRegistryError::not_found(code.as_ref()))?;
        if matches!(state, CodeState::Claimed { .. }) {
            return Err(ActivationRegistryError::already_claimed(code.as_ref()));
        }

        *state = CodeState::Claimed {
            owner: owner.clone(),
            claimed_at: self.clock.utc(),
        };
        info!(code = %code, owner = %owner, "activation code claimed");
        Ok(ActivationCodeRecord {
            code: code.clone(),
            state: state.clone(),
        })
    }
}
