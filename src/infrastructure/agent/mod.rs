//! Movie tools and the ReAct agent that drives them

mod react;
mod tools;

pub use react::{AgentStep, ReactAgent, DEFAULT_MAX_ITERATIONS, ITERATION_LIMIT_MESSAGE};
pub use tools::{movie_tools, MovieTool, MovieToolKind};
