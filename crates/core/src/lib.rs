#![deny(warnings)]

pub mod config;
pub mod dataset;
pub mod decode;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod walk;
