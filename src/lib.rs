//! Library side of quizcraft: everything except terminal setup lives here so
//! integration tests and benchmarks can drive it.

pub mod app;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod event;
pub mod flow;
pub mod generator;
pub mod session;
pub mod store;
pub mod ui;
