//! HTTP route handlers

pub mod alerts;
pub mod controls;
pub mod sensors;
pub mod status;
