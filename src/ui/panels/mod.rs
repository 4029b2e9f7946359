// ReelMend - ui/panels/mod.rs

pub mod about;
pub mod analyze;
pub mod notices;
pub mod output;
pub mod repair;
pub mod settings;
