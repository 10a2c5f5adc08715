//! HTTP request handlers

pub mod health;
pub mod proxy;
pub mod stats;
pub mod strategy;
