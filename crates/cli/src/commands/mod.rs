// Path: crates/cli/src/commands/mod.rs

pub mod default;
pub mod run;
pub mod validate;
