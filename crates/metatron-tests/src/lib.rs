//! End-to-end test suite for Metatron.
//!
//! Drives full sessions through the public engine API with a stepping clock
//! so that window counts are exact and no test waits on the wall clock.

pub mod helpers;
