pub mod interface;
pub mod cli;

pub use interface::{InferenceError, InferenceRequest, InferenceRunner};
pub use cli::RvcCliRunner;
