//! Palisade Filter List Compiler
//!
//! Turns raw filter-list text (EasyList subset plus hosts files) into a
//! [`pal_core::RuleSet`] ready for atomic installation into an engine.

pub mod builder;
pub mod parser;

pub use builder::{compile_list, CompileError, CompiledList, ListSummary};
pub use parser::{parse_filter_list, LineStats, ParseOutcome};
