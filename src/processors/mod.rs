pub mod month;
pub mod normalizer;
pub mod rules;
