pub mod config;
pub mod demo;
pub mod football_data;
pub mod hda;
pub mod http_cache;
pub mod http_client;
pub mod leagues;
pub mod llm;
pub mod news;
pub mod output;
pub mod rss;
pub mod runner;
pub mod scores;
pub mod signals;
pub mod transfers;
pub mod upcoming;
