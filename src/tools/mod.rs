//! Lookup Tools
//!
//! One registered capability: Wikipedia summaries. The REPL dispatches to
//! it directly; there is no general tool-routing framework.

pub mod wiki;
