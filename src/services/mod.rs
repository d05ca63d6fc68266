pub mod authorization;
pub mod relocation;
pub mod store;
pub mod task_service;
pub mod transaction;

pub use authorization::AuthorizationGuard;
pub use relocation::{RelocateTask, RelocationOutcome, RelocationService};
pub use store::BoardStore;
pub use task_service::TaskService;
pub use transaction::{with_transaction, RetryPolicy};
