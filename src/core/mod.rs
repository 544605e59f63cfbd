pub mod app;
pub mod archive;
pub mod config;
pub mod error;
pub mod git;
pub mod models;
pub mod path;
pub mod platform;
pub mod process;
pub mod svn;
pub mod svn_xml;
pub mod utils;
