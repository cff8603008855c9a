// src/core/mod.rs — Domain types, progress events and the comparison runner

pub mod events;
pub mod run;
pub mod types;
