//! State module for tracking article assembly progress
//!
//! `AssemblyState` names each stage an article passes through, so the
//! assembler can log transitions and refuse illegal ones.

mod assembly_state;

pub use assembly_state::AssemblyState;
