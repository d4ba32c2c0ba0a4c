pub mod bound;
pub mod domain;
pub mod run;
