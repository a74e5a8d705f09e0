pub mod result_assembler;
pub mod spread_engine;

pub use result_assembler::assemble_result;
pub use spread_engine::{build_progress, compute_summary, SpreadEngine, TimeWindow};
