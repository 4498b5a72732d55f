//! vdm: parser, validator and generator for Van der Meer scan sequences.

pub mod config;
pub mod dsl;
pub mod generator;
