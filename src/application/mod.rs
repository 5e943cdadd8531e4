mod markers;
mod mirror;
mod searches;
mod session;

pub use markers::{MarkerService, ToggleOutcome};
pub use mirror::MarkerMirror;
pub use searches::{RecentSearchService, RecordOutcome};
pub use session::{AuthError, AuthManager};
