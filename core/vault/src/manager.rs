//! The unlock pipeline.

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::detail;
use crate::hierarchy::KeyHierarchy;
use crate::index;
use crate::search::VaultIndex;
use keysafe_common::{Error, ProfileName, Result};
use keysafe_storage::{DetailRecord, ItemRecord, ProfileStore};

/// Unlock a profile and build its index.
///
/// # Procedure
/// 1. Fetch the profile
/// 2. Derive the top key pair and unwrap the hierarchy
/// 3. Fetch items and details, then release the store
/// 4. Decrypt overviews and item keys
/// 5. Resolve details
///
/// # Errors
/// - `ProfileNotFound`, `Storage` from the store
/// - `Authentication` for a wrong password
/// - Any overview failure; detail failures are not errors
pub async fn unlock(
    store: Box<dyn ProfileStore>,
    profile: &ProfileName,
    password: Zeroizing<Vec<u8>>,
) -> Result<VaultIndex> {
    let record = store.get_profile(profile).await?;
    let profile_id = record.id;
    info!(profile = %profile, store = store.name(), "Profile loaded");

    let keys = run_blocking(move || KeyHierarchy::unlock(&password, &record)).await?;
    info!(profile = %profile, "Key hierarchy unlocked");

    let items = store.list_items(profile_id).await?;
    let details = store.list_item_details().await?;
    drop(store);
    debug!(items = items.len(), details = details.len(), "Fetched vault rows");

    let index = run_blocking(move || build_index(&keys, &items, &details)).await?;
    info!(profile = %profile, entries = index.len(), "Vault index ready");

    Ok(index)
}

/// Decrypt already-fetched rows into an index.
pub fn build_index(
    keys: &KeyHierarchy,
    items: &[ItemRecord],
    details: &[DetailRecord],
) -> Result<VaultIndex> {
    let entries = index::build(items, keys)?;
    let entries = detail::resolve(entries, details);
    Ok(VaultIndex::new(entries))
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Vault(format!("Unlock task failed: {}", e)))?
}
