//! Operations exposed to callers.
//!
//! Owner operations take the caller's [`Identity`](crate::db::models::Identity) explicitly and
//! only ever see that owner's forms. Respondent operations are addressed by slug and share token.

pub mod accounts;
pub mod fields;
pub mod forms;
pub mod sharing;
