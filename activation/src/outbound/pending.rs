//! Pending-code storage adapters.
//!
//! [`InMemoryPendingCodeStore`] models per-tab session storage;
//! [`FilePendingCodeStore`] keeps the code in a state directory so it
//! survives between CLI invocations (open, sign in, resume).

use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use cap_std::{ambient_authority, fs::Dir};

use crate::domain::ActivationCode;
use crate::domain::ports::{PendingCodeStore, PendingCodeStoreError};

const PENDING_FILE_NAME: &str = "pending-activation-code";

/// Process-local pending-code store.
#[derive(Debug, Default)]
pub struct InMemoryPendingCodeStore {
    slot: Mutex<Option<ActivationCode>>,
}

impl InMemoryPendingCodeStore {
    fn lock_slot(&self) -> MutexGuard<'_, Option<ActivationCode>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PendingCodeStore for InMemoryPendingCodeStore {
    fn stash(&self, code: &ActivationCode) -> Result<(), PendingCodeStoreError> {
        *self.lock_slot() = Some(code.clone());
        Ok(())
    }

    fn peek(&self) -> Result<Option<ActivationCode>, PendingCodeStoreError> {
        Ok(self.lock_slot().clone())
    }

    fn take(&self) -> Result<Option<ActivationCode>, PendingCodeStoreError> {
        Ok(self.lock_slot().take())
    }
}

/// Pending-code store backed by one file inside a capability directory.
pub struct FilePendingCodeStore {
    dir: Dir,
    // Serialises read-then-remove within this process.
    guard: Mutex<()>,
}

impl FilePendingCodeStore {
    /// Open (creating if needed) the state directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or opened.
    pub fn open(path: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self {
            dir,
            guard: Mutex::new(()),
        })
    }

    fn read(&self) -> Result<Option<ActivationCode>, PendingCodeStoreError> {
        let raw = match self.dir.read_to_string(PENDING_FILE_NAME) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(PendingCodeStoreError::storage(error.to_string())),
        };
        ActivationCode::new(&raw)
            .map(Some)
            .map_err(|error| PendingCodeStoreError::corrupt(error.to_string()))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.guard.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PendingCodeStore for FilePendingCodeStore {
    fn stash(&self, code: &ActivationCode) -> Result<(), PendingCodeStoreError> {
        let _guard = self.lock();
        self.dir
            .write(PENDING_FILE_NAME, code.as_ref())
            .map_err(|error| PendingCodeStoreError::storage(error.to_string()))
    }

    fn peek(&self) -> Result<Option<ActivationCode>, PendingCodeStoreError> {
        let _guard = self.lock();
        self.read()
    }

    fn take(&self) -> Result<Option<ActivationCode>, PendingCodeStoreError> {
        let _guard = self.lock();
        let code = self.read();
        match self.dir.remove_file(PENDING_FILE_NAME) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(PendingCodeStoreError::storage(error.to_string())),
        }
        code
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for both pending-code stores.
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn code(raw: &str) -> ActivationCode {
        ActivationCode::new(raw).expect("fixture code")
    }

    fn exercise_store(store: &dyn PendingCodeStore) {
        assert_eq!(store.peek().expect("peek"), None);

        store.stash(&code("XYZ999")).expect("stash");
        store.stash(&code("ABC123")).expect("restash");
        assert_eq!(store.peek().expect("peek"), Some(code("ABC123")));

        assert_eq!(store.take().expect("take"), Some(code("ABC123")));
        assert_eq!(store.take().expect("second take"), None);
    }

    #[rstest]
    fn in_memory_store_keeps_the_latest_code_until_taken() {
        exercise_store(&InMemoryPendingCodeStore::default());
    }

    #[rstest]
    fn file_store_keeps_the_latest_code_until_taken() {
        let temp = TempDir::new().expect("temp dir");
        let store = FilePendingCodeStore::open(&temp.path().join("state")).expect("open store");
        exercise_store(&store);
    }

    #[rstest]
    fn file_store_survives_reopening() {
        let temp = TempDir::new().expect("temp dir");
        FilePendingCodeStore::open(temp.path())
            .expect("open store")
            .stash(&code("XYZ999"))
            .expect("stash");

        let reopened = FilePendingCodeStore::open(temp.path()).expect("reopen store");
        assert_eq!(reopened.take().expect("take"), Some(code("XYZ999")));
    }

    #[rstest]
    fn file_store_reports_and_clears_corrupt_content() {
        let temp = TempDir::new().expect("temp dir");
        let store = FilePendingCodeStore::open(temp.path()).expect("open store");
        store
            .dir
            .write(PENDING_FILE_NAME, "AB/C")
            .expect("write corrupt content");

        let error = store.take().expect_err("corrupt content must fail");
        assert!(matches!(error, PendingCodeStoreError::Corrupt { .. }));
        assert_eq!(store.peek().expect("peek"), None);
    }
}
