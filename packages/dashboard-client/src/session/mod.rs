//! Session ownership: storage, the store itself, and the login flow.

pub mod login;
pub mod storage;
pub mod store;

pub use login::{LoginFlow, LoginOutcome};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use store::{ExecutionContext, SessionStore, SESSION_KEY};
