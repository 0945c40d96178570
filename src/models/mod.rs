pub mod job;
pub mod stats;
pub mod status;
