pub mod challenges;
pub mod cli;
pub mod cmds;
pub mod diff;
pub mod fs_tree;
pub mod logging;
pub mod main_shared;
pub mod reports;
pub mod snippet;
pub mod store;
pub mod types;
