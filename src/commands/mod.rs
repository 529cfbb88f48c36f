pub mod config;
pub mod enable;
pub mod helpers;
pub mod install;
pub mod list;
pub mod remove;
pub mod sync;
pub mod update;
