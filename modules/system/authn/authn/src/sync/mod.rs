//! Built-in post-auth and post-login hooks.

pub mod last_seen;
pub mod login_audit;
pub mod org_sync;
pub mod session_refresh;
pub mod user_sync;

pub use last_seen::{ApiKeyLastSeenSync, UserLastSeenSync};
pub use login_audit::LoginAudit;
pub use org_sync::OrgSync;
pub use session_refresh::SessionRefreshHook;
pub use user_sync::UserSync;
