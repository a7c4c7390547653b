//! Session-scoped cache of the test set list.
//!
//! A [`TestSetStore`] is built once per session and handed by reference to
//! whatever needs it. It forwards writes to the service layer and keeps its
//! local `items` in step with every successful outcome.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::category::NewGroundTruthCategory;
use crate::domain::test_set::{TestSet, TestSetChanges, TestSetFields};
use crate::domain::types::TestSetId;
use crate::repository::{TestSetReader, TestSetWriter};
use crate::services::test_sets::{self, DeleteTestSetOutcome};
use crate::services::ServiceResult;

pub struct TestSetStore<R> {
    repo: R,
    principal: Option<AuthenticatedUser>,
    items: Vec<TestSet>,
    is_loading: bool,
    last_error: Option<String>,
    /// Bumped on every change to `items`; older snapshots are stale.
    generation: u64,
    reconciled_tx: Sender<(u64, Vec<TestSet>)>,
    reconciled_rx: Receiver<(u64, Vec<TestSet>)>,
    reconciliation: Option<JoinHandle<()>>,
}

impl<R> TestSetStore<R>
where
    R: TestSetReader + TestSetWriter + Clone + Send + 'static,
{
    pub fn new(repo: R, principal: Option<AuthenticatedUser>) -> Self {
        let (reconciled_tx, reconciled_rx) = mpsc::channel();
        Self {
            repo,
            principal,
            items: Vec::new(),
            is_loading: false,
            last_error: None,
            generation: 0,
            reconciled_tx,
            reconciled_rx,
            reconciliation: None,
        }
    }

    /// Cached test sets. Newest first after `refresh` and `create`; `update`
    /// keeps an entry at its previous position.
    pub fn items(&self) -> &[TestSet] {
        &self.items
    }

    /// Set while a write is in flight. Every operation takes `&mut self`
    /// and completes before returning, so callers only observe it as
    /// `false`; it is kept for callers that drive the store from another
    /// thread behind a lock.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the cached list with a fresh read. Never fails; read errors
    /// are logged by the service layer and yield an empty list.
    pub fn refresh(&mut self) {
        self.is_loading = true;
        self.items = test_sets::list_test_sets(&self.repo);
        self.generation += 1;
        self.last_error = None;
        self.is_loading = false;
    }

    pub fn create(
        &mut self,
        fields: TestSetFields,
        categories: &[NewGroundTruthCategory],
    ) -> ServiceResult<TestSet> {
        self.is_loading = true;
        let result =
            test_sets::create_test_set(fields, categories, self.principal.as_ref(), &self.repo);
        let created = self.settle(result)?;
        self.items.insert(0, created.clone().into_summary());
        self.generation += 1;
        Ok(created)
    }

    /// Update the parent fields and replace the category set.
    pub fn update(
        &mut self,
        id: TestSetId,
        changes: &TestSetChanges,
        categories: &[NewGroundTruthCategory],
    ) -> ServiceResult<TestSet> {
        self.is_loading = true;
        let result =
            test_sets::update_test_set_with_categories(id, changes, categories, &self.repo);
        let updated = self.settle(result)?;
        if let Some(slot) = self.items.iter_mut().find(|item| item.id == id) {
            *slot = updated.clone().into_summary();
        }
        self.generation += 1;
        Ok(updated)
    }

    /// Delete through the repository and drop the entry locally on success.
    ///
    /// Loading and error state are left alone. A successful delete also
    /// starts a background re-list whose result is picked up by
    /// [`Self::apply_reconciled`], unless the store changes again first.
    pub fn delete(&mut self, id: TestSetId) -> ServiceResult<DeleteTestSetOutcome> {
        let outcome = test_sets::delete_test_set(id, &self.repo)?;
        if outcome.success {
            self.remove_local(id);
            self.spawn_reconciliation();
        }
        Ok(outcome)
    }

    /// Drop an entry from the cache without touching the repository.
    pub fn remove_local(&mut self, id: TestSetId) {
        self.items.retain(|item| item.id != id);
        self.generation += 1;
    }

    /// Apply a finished reconciliation issued after the latest local change.
    /// Snapshots taken before a later write are discarded. Returns whether
    /// the cached list was replaced.
    pub fn apply_reconciled(&mut self) -> bool {
        let current = self.generation;
        let fresh = self
            .reconciled_rx
            .try_iter()
            .filter(|(generation, _)| *generation == current)
            .last();
        match fresh {
            Some((_, items)) => {
                self.items = items;
                true
            }
            None => false,
        }
    }

    /// Block until the pending reconciliation finishes, then apply it.
    pub fn await_reconciliation(&mut self) -> bool {
        if let Some(handle) = self.reconciliation.take() {
            if handle.join().is_err() {
                log::error!("Test set reconciliation thread panicked");
            }
        }
        self.apply_reconciled()
    }

    fn settle(&mut self, result: ServiceResult<TestSet>) -> ServiceResult<TestSet> {
        self.is_loading = false;
        match result {
            Ok(test_set) => {
                self.last_error = None;
                Ok(test_set)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn spawn_reconciliation(&mut self) {
        let repo = self.repo.clone();
        let tx = self.reconciled_tx.clone();
        let generation = self.generation;
        // Failures here must not change the outcome of the finished delete.
        let handle = thread::spawn(move || match repo.list_test_sets() {
            Ok(items) => {
                let _ = tx.send((generation, items));
            }
            Err(e) => log::warn!("Failed to refetch test sets after deletion: {e}"),
        });
        self.reconciliation = Some(handle);
    }
}
