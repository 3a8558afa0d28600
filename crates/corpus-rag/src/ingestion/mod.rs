//! Corpus loading from caller-supplied fragments

pub mod loader;

pub use loader::CorpusLoader;
