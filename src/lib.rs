pub mod app;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod output;
pub mod pipeline;
pub mod policy;
pub mod runner;

#[cfg(test)]
mod tests;
