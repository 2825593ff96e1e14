pub mod auth;
pub mod dashboard;
pub mod editor;
pub mod lecturers;
pub mod preview;
pub mod profile;
pub mod schedule;
pub mod tags;

pub use auth::AuthService;
pub use dashboard::Dashboard;
pub use editor::{EditorOptions, EditorSession, EditorStatus};
pub use lecturers::LecturerDirectory;
pub use preview::PdfPreview;
pub use profile::ProfileService;
pub use schedule::ScheduleBoard;
pub use tags::TagService;
