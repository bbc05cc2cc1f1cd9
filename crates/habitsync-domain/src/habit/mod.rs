mod aggregate;
mod value_objects;


pub use aggregate::Habit;
pub use value_objects::Frequency;
