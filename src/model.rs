//! Shared application state. One `Arc<AppState>` is built at startup and
//! cloned into every spawned per-update task. The catalog and locale
//! tables are immutable after load and safe for unsynchronized reads; all
//! mutable per-user state goes through the `SessionStore`.

use crate::catalog::Catalog;
use crate::database::SessionStore;
use crate::i18n::I18n;
use crate::replicate::ReplicateClient;
use crate::storage::StorageClient;
use crate::telegram::Telegram;

pub struct AppState {
    pub store: SessionStore,
    pub catalog: Catalog,
    pub i18n: I18n,
    pub telegram: Telegram,
    pub storage: StorageClient,
    pub replicate: ReplicateClient,
}
