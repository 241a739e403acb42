//! Salary raise computation.

pub mod calculator;
