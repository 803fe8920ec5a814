//! Infrastructure layer - Backends, providers and services

pub mod agent;
pub mod cache;
pub mod llm;
pub mod movie;
pub mod observability;
pub mod services;
