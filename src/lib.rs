// Core modules
pub mod ai;
pub mod cli;
pub mod commands;
pub mod config;
pub mod git;
pub mod infrastructure;
pub mod models;
pub mod storage;
pub mod ui;
pub mod workflow;
