//! Business logic shared by the route handlers

pub mod generation;
