//! Vault handle and readiness gate.
//!
//! Opening a vault starts the unlock pipeline in the background. Every
//! clone of a [`Vault`] shares one watch channel that moves from
//! `Unlocking` to either `Ready` or `Failed`; queries consult it and never
//! see a partially built index.

use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::config::VaultConfig;
use crate::entry::Entry;
use crate::manager;
use crate::search::VaultIndex;
use keysafe_common::{Error, ProfileName, Result};
use keysafe_storage::{ProfileStore, SqliteProfileStore};

/// State of the vault behind the readiness gate.
#[derive(Debug, Clone)]
enum UnlockState {
    /// Pipeline still running.
    Unlocking,
    /// Index built; queries are served.
    Ready(Arc<VaultIndex>),
    /// Pipeline failed; the vault is unusable.
    Failed(Error),
    /// Index dropped by [`Vault::lock`].
    Locked,
}

/// Handle to a vault being unlocked or already unlocked.
///
/// Cheap to clone; all clones share the same readiness gate.
#[derive(Clone)]
pub struct Vault {
    profile: ProfileName,
    state: Arc<watch::Sender<UnlockState>>,
}

impl Vault {
    /// Start unlocking the SQLite vault described by `config`.
    ///
    /// Returns as soon as the database is opened; use [`Vault::ready`] to
    /// wait for the unlock to finish.
    ///
    /// # Errors
    /// - Database cannot be opened
    /// - Called outside a tokio runtime
    pub fn open(config: &VaultConfig, password: &[u8]) -> Result<Self> {
        let store = SqliteProfileStore::open(config.database())?;
        Self::open_with_store(store, config.profile.clone(), password)
    }

    /// Open the vault described by `config` and wait for it to unlock.
    pub async fn unlock(config: &VaultConfig, password: &[u8]) -> Result<Self> {
        let vault = Self::open(config, password)?;
        vault.ready().await?;
        Ok(vault)
    }

    /// Start unlocking a profile from any store.
    ///
    /// The store is dropped once its rows have been read.
    ///
    /// # Errors
    /// - Called outside a tokio runtime
    pub fn open_with_store(
        store: impl ProfileStore + 'static,
        profile: ProfileName,
        password: &[u8],
    ) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Vault(format!("No async runtime: {}", e)))?;

        let (sender, _) = watch::channel(UnlockState::Unlocking);
        let state = Arc::new(sender);

        let password = Zeroizing::new(password.to_vec());
        let gate = Arc::clone(&state);
        let name = profile.clone();
        let pipeline = runtime.spawn(async move {
            manager::unlock(Box::new(store), &name, password).await
        });

        runtime.spawn(async move {
            let outcome = match pipeline.await {
                Ok(Ok(index)) => UnlockState::Ready(Arc::new(index)),
                Ok(Err(e)) => {
                    warn!(error = %e, "Vault unlock failed");
                    UnlockState::Failed(e)
                }
                Err(e) => UnlockState::Failed(Error::Vault(format!("Unlock task failed: {}", e))),
            };
            // A lock() issued mid-unlock wins over the late result.
            gate.send_if_modified(|state| {
                if matches!(state, UnlockState::Unlocking) {
                    *state = outcome;
                    true
                } else {
                    false
                }
            });
        });

        Ok(Self { profile, state })
    }

    /// Profile this vault unlocks.
    pub fn profile(&self) -> &ProfileName {
        &self.profile
    }

    /// Wait until unlock has finished.
    ///
    /// # Errors
    /// - The unlock error, if unlock failed
    /// - `NotReady` if the vault has been locked
    pub async fn ready(&self) -> Result<()> {
        let mut receiver = self.state.subscribe();
        let state = receiver
            .wait_for(|state| !matches!(state, UnlockState::Unlocking))
            .await
            .map_err(|_| Error::Vault("Readiness gate closed".to_string()))?;
        check(&state).map(|_| ())
    }

    /// Whether the index is built and queryable.
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), UnlockState::Ready(_))
    }

    /// The decrypted index, without waiting.
    ///
    /// # Errors
    /// - `NotReady` while unlocking or after [`Vault::lock`]
    /// - The unlock error, if unlock failed
    pub fn index(&self) -> Result<Arc<VaultIndex>> {
        check(&self.state.borrow())
    }

    /// Entries whose title equals `title` exactly.
    ///
    /// # Errors
    /// - `NotReady` while unlocking or after [`Vault::lock`]
    /// - The unlock error, if unlock failed
    /// - `NoMatch` if no entry has that title
    pub fn search(&self, title: &str) -> Result<Vec<Entry>> {
        let index = self.index()?;
        let matches = index.search(title)?;
        Ok(matches.into_iter().cloned().collect())
    }

    /// Drop the decrypted index for every clone of this handle.
    ///
    /// Key pairs are zeroized once the last outstanding index reference is
    /// released.
    pub fn lock(&self) {
        self.state.send_replace(UnlockState::Locked);
        info!(profile = %self.profile, "Vault locked");
    }
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("profile", &self.profile)
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

fn check(state: &UnlockState) -> Result<Arc<VaultIndex>> {
    match state {
        UnlockState::Ready(index) => Ok(Arc::clone(index)),
        UnlockState::Failed(e) => Err(e.clone()),
        UnlockState::Unlocking | UnlockState::Locked => Err(Error::NotReady),
    }
}
