pub mod adapters;
pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod screens;
pub mod session;
pub mod storage;
pub mod task_list;
pub mod validation;
