use clap::{Parser, Subcommand};
use learnsite::Config;
use learnsite::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use learnsite::model::entity::{
    Answer,
    AnswerCreate,
    Course,
    CourseCreate,
    CourseStatus,
    Question,
    QuestionCreate,
    QuestionKind,
    Quiz,
    QuizCreate,
    Text,
    TextCreate,
    UserEntity,
    UserEntityCreateUpdate,
};
use learnsite::web::AuthenticatedUser;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the course DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage reading steps
    Text {
        #[command(subcommand)]
        action: TextCommands,
    },

    /// Manage quizzes, their questions and answers
    Quiz {
        #[command(subcommand)]
        action: QuizCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
}

/// Course management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Username of the teacher owning the course
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        subject: Option<String>,
    },
    /// Moves a course to `in_progress`, `in_review` or `published`
    Status {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "published")]
        status: String,
    },
}

/// Text management
#[derive(Subcommand, Debug)]
pub enum TextCommands {
    Add {
        /// Course title to attach the text to
        #[arg(long)]
        course_title: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Path to a Markdown file with the text content
        #[arg(long)]
        file: String,
        #[arg(long, default_value_t = 0)]
        order: i32,
    },
}

/// Quiz management
#[derive(Subcommand, Debug)]
pub enum QuizCommands {
    Add {
        /// Course title to attach the quiz to
        #[arg(long)]
        course_title: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = 0)]
        order: i32,
        #[arg(long)]
        total_questions: Option<i32>,
    },
    AddQuestion {
        /// Quiz title to attach the question to
        #[arg(long)]
        quiz_title: String,
        /// `mc` or `tf`
        #[arg(long, default_value = "mc")]
        kind: String,
        #[arg(long)]
        prompt: String,
        #[arg(long, default_value_t = 0)]
        order: i32,
        #[arg(long, default_value_t = false)]
        shuffle_answers: bool,
    },
    AddAnswer {
        /// Question prompt to attach the answer to
        #[arg(long)]
        question_prompt: String,
        #[arg(long)]
        text: String,
        #[arg(long, default_value_t = 0)]
        order: i32,
        #[arg(long, default_value_t = false)]
        correct: bool,
    },
}

async fn lookup_id(mm: &ModelManager, query: &str, value: &str) -> Result<Uuid, DatabaseError> {
    let id = sqlx::query_scalar::<_, Uuid>(query)
        .bind(value)
        .fetch_one(mm.executor())
        .await?;
    Ok(id)
}

#[tokio::main]
async fn main() -> learnsite::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let database_uri = match std::env::var("DATABASE_URL") {
        Ok(uri) => uri,
        Err(_) => Config::get_or_init(false).await.app().database_uri().to_string(),
    };
    let db_con = DbConnection::connect(&database_uri)?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { username, password, role } => {
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate {
                        username,
                        password_hash: learnsite::auth::hash_password(&password)?,
                        role: Some(role),
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add { title, description, owner, subject } => {
                let owner_id = match owner {
                    Some(username) => {
                        Some(lookup_id(&mm, "SELECT id FROM users WHERE username = $1", &username).await?)
                    }
                    None => None,
                };

                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreate {
                        title,
                        description,
                        owner_id,
                        subject,
                    },
                )
                .await?;
                println!("Course created: {:?}", course);
            }

            CourseCommands::Status { title, status } => {
                let course_id = lookup_id(&mm, "SELECT id FROM courses WHERE title = $1", &title).await?;
                let course = Course::find_by_id(&mm, &actor, course_id)
                    .await?
                    .ok_or(DatabaseError::SqlxError(sqlx::Error::RowNotFound))?;

                let course = course
                    .set_status(&mm, &actor, CourseStatus::from(status.as_str()))
                    .await?;
                println!("Course {} is now {}", course.title(), course.status());
            }
        },

        Commands::Text { action } => match action {
            TextCommands::Add { course_title, title, description, file, order } => {
                let course_id = lookup_id(&mm, "SELECT id FROM courses WHERE title = $1", &course_title).await?;

                let content = std::fs::read_to_string(file)?;
                let text = Text::create(
                    &mm,
                    &actor,
                    TextCreate {
                        course_id,
                        title,
                        description,
                        order: Some(order),
                        content,
                    },
                )
                .await?;
                println!("Text created: {:?}", text);
            }
        },

        Commands::Quiz { action } => match action {
            QuizCommands::Add { course_title, title, description, order, total_questions } => {
                let course_id = lookup_id(&mm, "SELECT id FROM courses WHERE title = $1", &course_title).await?;

                let quiz = Quiz::create(
                    &mm,
                    &actor,
                    QuizCreate {
                        course_id,
                        title,
                        description,
                        order: Some(order),
                        total_questions,
                    },
                )
                .await?;
                println!("Quiz created: {:?}", quiz);
            }

            QuizCommands::AddQuestion { quiz_title, kind, prompt, order, shuffle_answers } => {
                let quiz_id = lookup_id(&mm, "SELECT id FROM quizzes WHERE title = $1", &quiz_title).await?;

                let question = Question::create(
                    &mm,
                    &actor,
                    QuestionCreate {
                        quiz_id,
                        kind: QuestionKind::from(kind.as_str()),
                        order: Some(order),
                        prompt,
                        shuffle_answers,
                    },
                )
                .await?;
                println!("Question created: {:?}", question);
            }

            QuizCommands::AddAnswer { question_prompt, text, order, correct } => {
                let question_id =
                    lookup_id(&mm, "SELECT id FROM questions WHERE prompt = $1", &question_prompt).await?;

                let answer = Answer::create(
                    &mm,
                    &actor,
                    AnswerCreate {
                        question_id,
                        order: Some(order),
                        text,
                        correct: Some(correct),
                    },
                )
                .await?;
                println!("Answer created: {:?}", answer);
            }
        },
    }

    Ok(())
}
