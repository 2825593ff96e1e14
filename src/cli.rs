use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::fs;

use crate::backend::{ImageUpload, TransformAction};
use crate::error::AppError;
use crate::routes::{self, Route};
use crate::services::{
    AuthService, Dashboard, EditorSession, LecturerDirectory, ProfileService, TagService,
};
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "skolamat", about = "Course material client for Skola Matematike", version)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password.
    Login {
        email: String,
        password: String,
    },
    /// Drop the stored session.
    Logout,
    /// List lecturers, optionally filtered.
    Lecturers {
        /// Substring to match against names and emails.
        search: Option<String>,
    },
    /// Invite a new lecturer by email.
    Invite {
        email: String,
        name: String,
        surname: String,
    },
    /// List problemsets, optionally filtered.
    Problemsets {
        search: Option<String>,
    },
    /// Show recently opened lectures.
    Recent,
    /// Open a lecture and print its problems.
    Open {
        id: i64,
    },
    /// Download a finalized problemset's PDF.
    Pdf {
        id: i64,
        /// Output file path.
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Compile a LaTeX file and write the resulting PDF.
    Compile {
        file: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Run an editor transform over a character range of a file.
    Transform {
        file: PathBuf,
        /// Start of the selection, in characters.
        start: usize,
        /// End of the selection, in characters.
        end: usize,
        #[arg(short, long, value_enum)]
        action: TransformArg,
    },
    /// Turn an image into LaTeX.
    Extract {
        image: PathBuf,
    },
    /// Search the problem bank.
    Problems {
        term: Option<String>,
    },
    /// Show the signed-in user's profile.
    Profile,
    /// Tag management.
    #[command(subcommand)]
    Tags(TagCommand),
}

#[derive(Debug, Subcommand)]
pub enum TagCommand {
    List,
    Create {
        name: String,
        #[arg(short, long)]
        color: Option<String>,
    },
    Delete {
        id: i64,
    },
    /// Replace a lecture's tags.
    Assign {
        lecture_id: i64,
        tag_ids: Vec<i64>,
    },
    /// List lectures carrying a tag.
    Lectures {
        tag_id: i64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TransformArg {
    FixLatex,
    FixGrammar,
    ReplaceWithX,
}

impl From<TransformArg> for TransformAction {
    fn from(arg: TransformArg) -> Self {
        match arg {
            TransformArg::FixLatex => TransformAction::FixLatex,
            TransformArg::FixGrammar => TransformAction::FixGrammar,
            TransformArg::ReplaceWithX => TransformAction::ReplaceWithX,
        }
    }
}

impl Command {
    /// The view this command corresponds to, fed through the same route
    /// guard the views use.
    fn path(&self, user_id: Option<i64>) -> String {
        match self {
            Command::Login { .. } | Command::Logout => "/login".to_string(),
            Command::Lecturers { .. } | Command::Invite { .. } => "/predavaci".to_string(),
            Command::Open { id } => format!("/lecture/{id}"),
            Command::Compile { .. } | Command::Transform { .. } | Command::Extract { .. } => {
                "/editor".to_string()
            }
            Command::Profile => format!("/profile/{}", user_id.unwrap_or_default()),
            _ => "/".to_string(),
        }
    }
}

pub async fn run(state: AppState, cli: Cli) -> Result<(), AppError> {
    let mut store = state.open_store()?;

    let session = store.session().cloned();
    let path = cli.command.path(session.as_ref().map(|s| s.user_id));
    let route = routes::resolve(&path, session.as_ref());
    if route == Route::Login && !matches!(cli.command, Command::Login { .. } | Command::Logout) {
        return Err(AppError::Unauthorized);
    }

    match cli.command {
        Command::Login { email, password } => {
            let auth = AuthService::new(state.api.clone());
            let session = auth.login(&mut store, &email, &password).await?;
            println!("signed in as user {} ({})", session.user_id, session.role);
        }
        Command::Logout => {
            AuthService::new(state.api.clone()).logout(&mut store)?;
            println!("signed out");
        }
        Command::Lecturers { search } => {
            let session = require(session)?;
            let mut dir = LecturerDirectory::new(state.api.clone());
            dir.fetch(&session.token).await?;
            for user in dir.filter(search.as_deref().unwrap_or_default()) {
                println!("{:>4}  {}  <{}>  {}", user.id, user.display_name(), user.email, user.role);
            }
        }
        Command::Invite { email, name, surname } => {
            let session = require(session)?;
            let dir = LecturerDirectory::new(state.api.clone());
            dir.invite(&session.token, &email, &name, &surname).await?;
            println!("invite sent to {email}");
        }
        Command::Problemsets { search } => {
            let mut dash = Dashboard::new(state.api.clone());
            dash.fetch().await?;
            for set in dash.filter(search.as_deref().unwrap_or_default()) {
                let group = set.group_name.as_deref().unwrap_or("-");
                let status = if set.finalized { "finalized" } else { "draft" };
                println!("{:>4}  {}  [{group}]  {status}", set.id, set.title);
            }
        }
        Command::Recent => {
            let dash = Dashboard::new(state.api.clone());
            for set in dash.recent(&store).await {
                println!("{:>4}  {}", set.id, set.title);
            }
        }
        Command::Open { id } => {
            let dash = Dashboard::new(state.api.clone());
            let lecture = dash.open_lecture(&mut store, id).await?;
            println!("{} ({})", lecture.title, if lecture.finalized { "finalized" } else { "draft" });
            for link in lecture.sorted_problems() {
                if let Some(problem) = &link.problem {
                    println!("  {:>3}. {}", link.position.unwrap_or_default(), problem.latex_text);
                }
            }
        }
        Command::Pdf { id, out } => {
            let dash = Dashboard::new(state.api.clone());
            let bytes = dash.download_pdf(id).await?;
            fs::write(&out, bytes).await?;
            println!("wrote {}", out.display());
        }
        Command::Compile { file, out } => {
            let latex = fs::read_to_string(&file).await?;
            let mut editor = EditorSession::new_untitled(state.api.clone(), "cli");
            editor.document_mut().set_text(latex);
            let preview = editor.compile().await?;
            fs::copy(&preview, &out).await?;
            println!("wrote {}", out.display());
        }
        Command::Transform { file, start, end, action } => {
            let latex = fs::read_to_string(&file).await?;
            let mut editor = EditorSession::new_untitled(state.api.clone(), "cli");
            editor.document_mut().set_text(latex);
            editor.document_mut().select(start, end);
            editor.transform_selection(action.into()).await?;
            fs::write(&file, editor.document().text()).await?;
            println!("updated {}", file.display());
        }
        Command::Extract { image } => {
            let bytes = fs::read(&image).await?;
            let filename = image
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("clipboard.png")
                .to_string();
            let mut editor = EditorSession::new_untitled(state.api.clone(), "cli");
            editor.document_mut().set_text("");
            editor
                .paste_image(ImageUpload {
                    bytes,
                    filename,
                    mime: "image/png".to_string(),
                })
                .await?;
            println!("{}", editor.document().text());
        }
        Command::Problems { term } => {
            let dash = Dashboard::new(state.api.clone());
            let problems = dash.search_problems(term.as_deref().unwrap_or_default()).await?;
            for p in problems {
                let lecture = p.lecture_title.as_deref().unwrap_or("-");
                println!("{:>4}  [{lecture}]  {}", p.id, p.latex_text);
            }
        }
        Command::Profile => {
            let session = require(session)?;
            let profile = ProfileService::new(state.api.clone());
            let user = profile.fetch(&session.token, session.user_id).await?;
            println!("{} <{}> ({})", user.display_name(), user.email, user.role);
            if let Some(image) = &user.profile_image {
                println!("photo: {image}");
            }
        }
        Command::Tags(cmd) => {
            let mut tags = TagService::new(state.api.clone());
            match cmd {
                TagCommand::List => {
                    tags.fetch().await?;
                    for tag in tags.tags() {
                        println!("{:>4}  {}  {}", tag.id, tag.name, tag.color.as_deref().unwrap_or("-"));
                    }
                }
                TagCommand::Create { name, color } => {
                    let tag = tags.create(&name, color.as_deref()).await?;
                    println!("created tag {} ({})", tag.name, tag.id);
                }
                TagCommand::Delete { id } => {
                    tags.delete(id).await?;
                    println!("deleted tag {id}");
                }
                TagCommand::Assign { lecture_id, tag_ids } => {
                    let assigned = tags.assign(lecture_id, &tag_ids).await?;
                    let names: Vec<&str> = assigned.iter().map(|t| t.name.as_str()).collect();
                    println!("lecture {lecture_id} tagged: {}", names.join(", "));
                }
                TagCommand::Lectures { tag_id } => {
                    for set in tags.lectures_for(tag_id).await? {
                        println!("{:>4}  {}", set.id, set.title);
                    }
                }
            }
        }
    }
    Ok(())
}

fn require(session: Option<Session>) -> Result<Session, AppError> {
    session.ok_or(AppError::Unauthorized)
}
