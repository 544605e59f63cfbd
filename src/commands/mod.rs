//! ### 指令集合


pub mod fs;
pub mod git;
pub mod svn;
