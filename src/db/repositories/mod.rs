pub mod fields;
pub mod forms;
pub mod share_tokens;
pub mod users;
