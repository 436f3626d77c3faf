pub mod mastery;
pub mod profile;
pub mod question;
pub mod session;
pub mod skill;
pub mod streak;

pub use profile::{ErrorLog, Profile, Progress, Settings, UnitRecord, WeeklyRecord};
pub use question::{Difficulty, ErrorType, Question};
pub use session::{Session, SessionKind};
pub use skill::{SkillLedger, SkillRecord};
pub use streak::{Streak, StreakUpdate};
