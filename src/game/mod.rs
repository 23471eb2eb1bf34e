pub mod constants;
pub mod grid;
pub mod room;
pub mod snake;
pub mod types;
