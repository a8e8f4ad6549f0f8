pub mod refresh;
pub mod stats;
