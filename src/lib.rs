pub mod content;
pub mod database;
pub mod export;
pub mod generators;
pub mod models;
pub mod report;
pub mod session;

pub use models::{Difficulty, ErrorType, Profile, Progress, Question, Session, SessionKind};
