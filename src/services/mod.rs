pub mod activity;
pub mod poller;
pub mod printer;
pub mod processor;
pub mod queue;
pub mod stats;
pub mod store;
