pub mod once;
pub mod run;
