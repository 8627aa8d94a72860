//! Shared utility modules used across Sardonic components.

pub mod fs;
