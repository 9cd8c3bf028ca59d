pub mod batch;
pub mod checklist;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod history;
pub mod logging;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod trends;
pub mod util;
pub mod wib;
