// Infrastructure layer - adapters for the domain's collaborator traits

pub mod logging;
pub mod memory;
