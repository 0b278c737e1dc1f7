mod user;
pub use user::{UserEntity, UserEntityCreateUpdate};

mod course;
pub use course::{Course, CourseCreate, CourseNavRow, CourseStatus, NAV_COURSES_LIMIT};

mod text;
pub use text::{Text, TextCreate};

mod quiz;
pub use quiz::{DEFAULT_TOTAL_QUESTIONS, Quiz, QuizCreate};

mod step;
pub use step::{Step, StepKind, merge_steps, step_detail_path};

mod question;
pub use question::{Question, QuestionCreate, QuestionKind};

mod answer;
pub use answer::{Answer, AnswerCreate};
