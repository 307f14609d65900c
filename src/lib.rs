pub mod analyzers;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod geo_layer;
pub mod html;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod records;
pub mod server;
pub mod stats;
