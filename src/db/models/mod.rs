pub mod field;
pub mod form;
pub mod share_token;
pub mod user;

pub use field::{Field, FieldInput, FieldKind};
pub use form::{Form, FormDetail, FormInput, FormStatus};
pub use share_token::ShareToken;
pub use user::{Identity, User};
