// Application layer - orchestrates domain logic against the remote
// collaborators; no presentation concerns

pub mod application;
