pub mod completion_queries;
pub mod streak_queries;
