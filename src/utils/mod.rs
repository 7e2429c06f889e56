//! Utility modules: storage locations and the best-score port.

pub mod persistence;
