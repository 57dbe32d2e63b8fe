//! Configuration parsing for Scout workspaces

pub mod workspace;
