mod habit_mutation_service;
mod route_guard;
mod session_manager;
mod synced_collection;


pub use habit_mutation_service::HabitMutationService;
pub use route_guard::{RouteAction, RouteGuard};
pub use session_manager::SessionManager;
pub use synced_collection::SyncedCollection;
