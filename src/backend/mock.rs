//! In-memory `ApiClient` used by tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;

use crate::error::AppError;
use crate::models::{Problem, Problemset, ProblemWithLecture, Role, Tag, User};

use super::dto::*;
use super::{ApiClient, ByteStream, ImageUpload, PdfOutput, TransformAction};

/// Scriptable stand-in for the real backend. Fixtures go in through the
/// public fields, every trait call is recorded in `calls`.
#[derive(Default)]
pub struct MockApi {
    pub calls: Mutex<Vec<String>>,
    pub session: Mutex<Option<SessionResponse>>,
    pub users: Mutex<Vec<User>>,
    pub problemsets: Mutex<Vec<Problemset>>,
    pub tags: Mutex<Vec<Tag>>,
    pub problems: Mutex<Vec<ProblemWithLecture>>,
    pub lecture_tag_ids: Mutex<HashMap<i64, Vec<i64>>>,
    /// Chunks served by both streaming endpoints.
    pub stream_chunks: Mutex<Vec<Vec<u8>>>,
    /// Fail streaming requests before any chunk is produced.
    pub fail_stream: AtomicBool,
    /// Serve the configured chunks, then end the stream with an error.
    pub fail_stream_mid: AtomicBool,
    pub compile_output: Mutex<Option<PdfOutput>>,
    pub fail_compile: AtomicBool,
    next_id: AtomicI64,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    pub fn with_session(self, session: SessionResponse) -> Self {
        *self.session.lock().unwrap() = Some(session);
        self
    }

    pub fn with_stream_text(self, text: &str) -> Self {
        *self.stream_chunks.lock().unwrap() = vec![text.as_bytes().to_vec()];
        self
    }

    pub fn with_stream_chunks(self, chunks: Vec<Vec<u8>>) -> Self {
        *self.stream_chunks.lock().unwrap() = chunks;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.split(':').next() == Some(name))
            .count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn session_or_denied(&self) -> Result<SessionResponse, AppError> {
        self.session
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::Api {
                status: 400,
                message: "Invalid credentials".to_string(),
            })
    }

    fn make_stream(&self) -> Result<ByteStream, AppError> {
        if self.fail_stream.load(Ordering::SeqCst) {
            return Err(AppError::Api {
                status: 500,
                message: "stream unavailable".to_string(),
            });
        }
        let chunks: Vec<Result<Vec<u8>, AppError>> = self
            .stream_chunks
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(Ok)
            .collect();
        if self.fail_stream_mid.load(Ordering::SeqCst) {
            let tail = stream::iter(vec![Err(AppError::Api {
                status: 500,
                message: "stream interrupted".to_string(),
            })]);
            return Ok(stream::iter(chunks).chain(tail).boxed());
        }
        Ok(stream::iter(chunks).boxed())
    }

    fn find_user(&self, id: i64) -> Result<User, AppError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    fn find_problemset(&self, id: i64) -> Result<Problemset, AppError> {
        self.problemsets
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn login(&self, req: LoginRequest) -> Result<SessionResponse, AppError> {
        self.record(format!("login:{}", req.email));
        self.session_or_denied()
    }

    async fn login_google(&self, _id_token: &str) -> Result<SessionResponse, AppError> {
        self.record("login_google");
        self.session_or_denied()
    }

    async fn accept_invite(
        &self,
        invite_id: &str,
        _req: AcceptInviteRequest,
    ) -> Result<SessionResponse, AppError> {
        self.record(format!("accept_invite:{invite_id}"));
        self.session_or_denied()
    }

    async fn accept_invite_google(
        &self,
        invite_id: &str,
        _id_token: &str,
    ) -> Result<SessionResponse, AppError> {
        self.record(format!("accept_invite_google:{invite_id}"));
        self.session_or_denied()
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        self.record(format!("request_password_reset:{email}"));
        Ok(())
    }

    async fn confirm_password_reset(&self, _req: PasswordResetConfirm) -> Result<(), AppError> {
        self.record("confirm_password_reset");
        Ok(())
    }

    async fn list_users(&self, _token: &str) -> Result<Vec<User>, AppError> {
        self.record("list_users");
        Ok(self.users.lock().unwrap().clone())
    }

    async fn get_user(&self, _token: &str, id: i64) -> Result<User, AppError> {
        self.record(format!("get_user:{id}"));
        self.find_user(id)
    }

    async fn update_user(
        &self,
        _token: &str,
        id: i64,
        req: UserUpdateRequest,
    ) -> Result<User, AppError> {
        self.record(format!("update_user:{id}"));
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        user.name = req.name;
        user.surname = req.surname;
        user.email = req.email;
        Ok(user.clone())
    }

    async fn change_password(
        &self,
        _token: &str,
        id: i64,
        _req: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        self.record(format!("change_password:{id}"));
        Ok(())
    }

    async fn set_password(
        &self,
        _token: &str,
        id: i64,
        _req: SetPasswordRequest,
    ) -> Result<(), AppError> {
        self.record(format!("set_password:{id}"));
        Ok(())
    }

    async fn upload_photo(
        &self,
        _token: &str,
        id: i64,
        image: ImageUpload,
    ) -> Result<User, AppError> {
        self.record(format!("upload_photo:{id}"));
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        user.profile_image = Some(format!("/media/{}", image.filename));
        Ok(user.clone())
    }

    async fn delete_photo(&self, _token: &str, id: i64) -> Result<User, AppError> {
        self.record(format!("delete_photo:{id}"));
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        user.profile_image = None;
        Ok(user.clone())
    }

    async fn update_role(&self, _token: &str, id: i64, role: Role) -> Result<User, AppError> {
        self.record(format!("update_role:{id}"));
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        user.role = role;
        Ok(user.clone())
    }

    async fn send_invite(&self, _token: &str, req: InviteRequest) -> Result<(), AppError> {
        self.record(format!("send_invite:{}", req.to_email));
        Ok(())
    }

    async fn list_problemsets(&self) -> Result<Vec<Problemset>, AppError> {
        self.record("list_problemsets");
        Ok(self.problemsets.lock().unwrap().clone())
    }

    async fn get_problemset(&self, id: i64) -> Result<Problemset, AppError> {
        self.record(format!("get_problemset:{id}"));
        self.find_problemset(id)
    }

    async fn create_problemset(&self, req: NewProblemsetRequest) -> Result<Problemset, AppError> {
        self.record("create_problemset");
        let problemset = Problemset {
            id: self.next_id(),
            title: req.title,
            kind: req.kind,
            part_of: req.part_of,
            group_name: req.group_name,
            raw_latex: None,
            finalized: false,
            problems: Vec::new(),
        };
        self.problemsets.lock().unwrap().push(problemset.clone());
        Ok(problemset)
    }

    async fn save_draft(&self, id: i64, raw_latex: &str) -> Result<Problemset, AppError> {
        self.record(format!("save_draft:{id}"));
        let mut sets = self.problemsets.lock().unwrap();
        let set = sets
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound)?;
        set.raw_latex = Some(raw_latex.to_string());
        Ok(set.clone())
    }

    async fn finalize_problemset(&self, id: i64, raw_latex: &str) -> Result<Problemset, AppError> {
        self.record(format!("finalize_problemset:{id}"));
        let mut sets = self.problemsets.lock().unwrap();
        let set = sets
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound)?;
        set.raw_latex = Some(raw_latex.to_string());
        set.finalized = true;
        Ok(set.clone())
    }

    async fn lecture_data(&self, id: i64) -> Result<Problemset, AppError> {
        self.record(format!("lecture_data:{id}"));
        self.find_problemset(id)
    }

    async fn problemset_pdf(&self, id: i64) -> Result<Vec<u8>, AppError> {
        self.record(format!("problemset_pdf:{id}"));
        self.find_problemset(id)?;
        Ok(b"%PDF-1.5 mock".to_vec())
    }

    async fn compile_latex(&self, _latex_code: &str) -> Result<PdfOutput, AppError> {
        self.record("compile_latex");
        if self.fail_compile.load(Ordering::SeqCst) {
            return Err(AppError::Api {
                status: 500,
                message: "compilation failed".to_string(),
            });
        }
        Ok(self
            .compile_output
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| PdfOutput {
                bytes: b"%PDF-1.5 mock".to_vec(),
                content_type: "application/pdf".to_string(),
            }))
    }

    async fn list_problems(&self) -> Result<Vec<Problem>, AppError> {
        self.record("list_problems");
        Ok(self
            .problems
            .lock()
            .unwrap()
            .iter()
            .map(|p| Problem {
                id: p.id,
                latex_text: p.latex_text.clone(),
                category: p.category.clone(),
            })
            .collect())
    }

    async fn problems_with_lecture(&self) -> Result<Vec<ProblemWithLecture>, AppError> {
        self.record("problems_with_lecture");
        Ok(self.problems.lock().unwrap().clone())
    }

    async fn search_problems(&self, term: &str) -> Result<Vec<ProblemWithLecture>, AppError> {
        self.record(format!("search_problems:{term}"));
        let needle = term.to_lowercase();
        Ok(self
            .problems
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.latex_text.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        self.record("list_tags");
        Ok(self.tags.lock().unwrap().clone())
    }

    async fn create_tag(&self, req: NewTagRequest) -> Result<Tag, AppError> {
        self.record("create_tag");
        let tag = Tag {
            id: self.next_id(),
            name: req.name,
            color: req.color,
        };
        self.tags.lock().unwrap().push(tag.clone());
        Ok(tag)
    }

    async fn delete_tag(&self, id: i64) -> Result<(), AppError> {
        self.record(format!("delete_tag:{id}"));
        let mut tags = self.tags.lock().unwrap();
        let before = tags.len();
        tags.retain(|t| t.id != id);
        if tags.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn tag_lectures(&self, tag_id: i64) -> Result<Vec<Problemset>, AppError> {
        self.record(format!("tag_lectures:{tag_id}"));
        let assignments = self.lecture_tag_ids.lock().unwrap();
        let sets = self.problemsets.lock().unwrap();
        Ok(sets
            .iter()
            .filter(|p| {
                assignments
                    .get(&p.id)
                    .is_some_and(|ids| ids.contains(&tag_id))
            })
            .cloned()
            .collect())
    }

    async fn lecture_tags(&self, lecture_id: i64) -> Result<Vec<Tag>, AppError> {
        self.record(format!("lecture_tags:{lecture_id}"));
        let ids = self
            .lecture_tag_ids
            .lock()
            .unwrap()
            .get(&lecture_id)
            .cloned()
            .unwrap_or_default();
        Ok(self
            .tags
            .lock()
            .unwrap()
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn set_lecture_tags(
        &self,
        lecture_id: i64,
        tag_ids: &[i64],
    ) -> Result<Vec<Tag>, AppError> {
        self.record(format!("set_lecture_tags:{lecture_id}"));
        self.lecture_tag_ids
            .lock()
            .unwrap()
            .insert(lecture_id, tag_ids.to_vec());
        self.lecture_tags(lecture_id).await
    }

    async fn transform_latex(
        &self,
        action: TransformAction,
        _code: &str,
    ) -> Result<ByteStream, AppError> {
        self.record(format!("transform_latex:{}", action.route()));
        self.make_stream()
    }

    async fn latex_from_image(&self, _image: ImageUpload) -> Result<ByteStream, AppError> {
        self.record("latex_from_image");
        self.make_stream()
    }
}
