pub mod courses;
pub mod forms;
