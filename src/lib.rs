pub mod cli;
pub mod config;
pub mod nfa;
pub mod pattern;
pub mod spec;
