//! Implementation of search problems.
//!
//! These expose the boards, the moves between them and the heuristics that
//! guide a search towards a goal board.

pub mod eight_puzzle;
