// src/ingest/providers/mod.rs
pub mod citizen_space;
pub mod civiq_rss;
