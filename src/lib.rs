// src/lib.rs — Library root for wayfare

pub mod cli;
pub mod core;
pub mod evaluation;
pub mod generation;
pub mod infra;
pub mod prompts;
pub mod provider;
pub mod retrieval;
pub mod util;
