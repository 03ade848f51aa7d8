#![forbid(unsafe_code)]

pub mod batch;
pub mod cli;
pub mod config;
pub mod detail;
pub mod fetch;
pub mod formats;
pub mod html;
pub mod listing;
pub mod logging;
pub mod paginate;
pub mod run;
pub mod sellers;
pub mod sink;
pub mod site;

#[cfg(test)]
mod testing;
