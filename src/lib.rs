pub mod commands;
pub mod config;
pub mod doctor;
pub mod error;
pub mod fs_utils;
pub mod git_url;
pub mod keys;
pub mod paths;
pub mod profiles;
pub mod ssh_config;
pub mod switch;
pub mod system;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
