mod domain_service;

pub use domain_service::{StreakDomainService, StreakStats};
