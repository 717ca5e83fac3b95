//! API Routes
//!
//! Route handlers organized by functionality.

pub mod catalog;
pub mod daily;
pub mod exports;
pub mod health;
