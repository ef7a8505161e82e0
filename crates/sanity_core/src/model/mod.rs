mod ids;
mod results;
mod session;
mod validate;

pub use ids::{SessionId, VariableId};
pub use results::{
    EngineWarning, EvaluateResult, HistogramBin, MonteCarloResult, MonteCarloStats, SweepPoint,
    SweepResult, merge_warnings,
};
pub use session::{
    Distribution, LabSession, MC_ITERATIONS_DEFAULT, MC_ITERATIONS_MAX, MC_ITERATIONS_MIN,
    MonteCarloConfig, SWEEP_POINTS_DEFAULT, SWEEP_POINTS_MAX, SWEEP_POINTS_MIN, SavedSession,
    SweepConfig, VariableEntry,
};
