pub mod extraction;
pub mod parameters;
pub mod solver;
pub mod stage_one;
pub mod stage_two;

pub use parameters::{StageOneParameters, StageTwoParameters, TradeLimits, TradeParameters};
pub use solver::{SolveOutcome, EPSILON};
pub use stage_one::{solve_stage_one, StageOneSolution};
pub use stage_two::{solve_stage_two, StageTwoSolution};
