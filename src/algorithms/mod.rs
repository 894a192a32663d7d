//! Implementation of search algorithms.
//!
//! These algorithms do path-finding between two boards of the 8-puzzle.

pub mod astar;
