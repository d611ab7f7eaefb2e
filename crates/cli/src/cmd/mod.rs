pub mod build;
pub mod paths;
