// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler here resolves its tenant through `AppState::tenants` before
// doing any work, so authorization failures never reach the store.
pub mod sessions;
