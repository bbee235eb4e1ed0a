// crates/lockstake-cli/src/commands/mod.rs
//
// Command module declarations for the lockstake CLI.

pub mod params;
pub mod project;
pub mod run;
