pub mod ai;
pub mod entity;
pub mod error;
pub mod graph;
pub mod grid;
pub mod rng;
pub mod side;
pub mod triangle;
