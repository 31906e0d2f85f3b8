pub mod cell;
pub mod controller;
pub mod dispatch;
pub mod events;
pub mod grid;
pub mod labels;
pub mod store;
