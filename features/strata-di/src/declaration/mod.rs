pub mod component;
pub mod dependent;
pub mod provider;
