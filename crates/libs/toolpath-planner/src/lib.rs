//! Motion-planning core: a grouped move queue, a planner that decides
//! travel/retraction/boundary behaviour and per-layer speed factors, and a
//! single-pass emitter that turns the queue into writer calls.

mod emit;
mod error;
mod planner;
mod ports;
mod queue;

#[cfg(test)]
mod testutil;

pub use error::PlannerError;
pub use planner::Planner;
pub use ports::{BoundaryHelper, GCodeWriter, OptimizedOrder, PathOrderOptimizer};
pub use queue::PathQueue;
