pub mod alphabeta;
pub mod config;
pub mod eval;
pub mod limits;
pub mod ordering;
pub mod report;
pub mod see;
pub mod smp;
pub mod tablebase;
pub mod tt;

pub use alphabeta::{SearchContext, SearchWorker, WorkerResult};
pub use config::{SearchConfig, SearchTuning};
pub use eval::{Evaluator, MaterialEval, PstEval};
pub use limits::{SearchLimits, StopSignal};
pub use report::{LogReporter, NullReporter, Reporter, Score, SearchInfo, SearchOutcome};
pub use smp::ThreadPool;
pub use tablebase::{EndgameProbe, TbOutcome, TbProbe};
pub use tt::{Bound, Tt};
