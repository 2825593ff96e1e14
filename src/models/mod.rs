pub mod problemset;
pub mod schedule;
pub mod tag;
pub mod user;

pub use problemset::{Problem, ProblemLink, Problemset, ProblemWithLecture};
pub use schedule::ScheduleEntry;
pub use tag::Tag;
pub use user::{Role, User};
