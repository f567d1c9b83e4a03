pub mod browse;
pub mod qtproj;
pub mod repo_build;
