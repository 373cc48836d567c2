pub mod error;
pub mod mask;
