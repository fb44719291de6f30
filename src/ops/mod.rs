pub mod subscribers;
pub mod task_store;
pub mod theme_clock;
