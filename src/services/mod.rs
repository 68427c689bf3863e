pub mod consensus;
pub mod normalizer;
pub mod report;
pub mod scoring;
pub mod signal_engine;
