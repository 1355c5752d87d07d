//! Regenerates Daedalus source text from a semantic model.

mod generator;
mod layout;
mod options;

pub use generator::{generate, generate_dialog, generate_function};
pub use layout::{display_name, section_banner};
pub use options::GeneratorOptions;
