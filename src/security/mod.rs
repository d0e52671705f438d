pub mod validator;

pub use validator::{ValidationError, optional_ref, require_ref, require_value, require_working_dir};
