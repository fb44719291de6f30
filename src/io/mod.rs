pub mod config_io;
pub mod logging;
pub mod recovery;
pub mod store;
pub mod watcher;
