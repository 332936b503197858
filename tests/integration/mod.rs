//! Integration test modules.
//!
//! Each module focuses on one feature area of the HTTP surface.

pub mod board_tests;
pub mod general_tests;
pub mod report_tests;
pub mod sync_tests;
