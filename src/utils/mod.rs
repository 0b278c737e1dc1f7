pub mod signal;
pub mod text;
