pub mod action;
pub mod condition;
pub mod error;
pub mod model;
pub mod types;
pub mod value;

pub use action::Action;
pub use condition::{invert_operator, is_comparison_operator, Condition};
pub use error::{DaedalusError, ErrorStage};
pub use model::*;
pub use types::*;
pub use value::*;
