pub mod composer;
pub mod config;
pub mod installer;
pub mod logging;
pub mod php;
pub mod platform;
pub mod version;
