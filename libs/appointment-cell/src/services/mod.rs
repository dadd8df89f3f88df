pub mod backend;
pub mod history;
pub mod join_window;
pub mod reconcile;
