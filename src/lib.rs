//! FitX Coach: lead-capture wizard and AI fitness chat.

pub mod cli;
pub mod coaching;
pub mod config;
pub mod error;
pub mod llm;
pub mod sessions;
pub mod web;
