use crate::common::DomainResult;

/// Storage for exported map snapshots, addressed by a plain name.
pub trait MapStore: Send + Sync {
    /// Store the JSON under `name`, replacing any previous map of that name.
    fn save_map(&self, name: &str, json: &str) -> DomainResult<()>;
    fn load_map(&self, name: &str) -> DomainResult<String>;
    /// Names of all stored maps, sorted.
    fn list_maps(&self) -> DomainResult<Vec<String>>;
}
