pub mod grading;
pub mod scoring;
