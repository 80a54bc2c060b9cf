pub mod account;
pub mod session;

pub use account::{AccountQuery, QueryResult};
pub use session::{Authenticated, PortalSession, RequestToken, SessionRecord};
