pub mod parser;
pub mod runner;

pub use parser::{parse_script, Statement};
pub use runner::{run_script, ScriptEnv};
