pub mod api;
pub mod common;
pub mod db;
pub mod draw;
pub mod mongodb;
pub mod tally;
