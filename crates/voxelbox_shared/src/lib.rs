pub mod block;
pub mod breaking;
pub mod config;
pub mod coords;
pub mod error;
pub mod grid;
pub mod inventory;
pub mod item_drop;
pub mod physics;
pub mod recipe;
pub mod sim;
pub mod worldgen;
