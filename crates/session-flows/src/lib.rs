//! Session flows
//!
//! The two stateful procedures of a scraping session: [`LoginFlow`]
//! authenticates once per session and owns every [`SessionState`]
//! transition; [`SearchFlow`] turns a free-text term into the URL of the
//! first matching product page. Both ride on the selector resolver, the
//! retry policy, and the behavior pacer.

pub mod login;
pub mod search;
pub mod submit;
pub mod types;

pub use login::{LoginFlow, LoginOutcome};
pub use search::SearchFlow;
pub use types::{Credentials, SearchOutcome, SessionState, SiteProfile};
