pub mod context;
pub mod list;
pub mod owner;
pub mod schema;
pub mod summary;
pub mod watch;
