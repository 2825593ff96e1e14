pub mod dto;
pub mod mock;

use std::env;
use std::path::PathBuf;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppError;
use crate::models::{Problem, Problemset, ProblemWithLecture, Role, Tag, User};

use dto::*;

/// Raw byte chunks of a streaming response. Chunk boundaries carry no
/// meaning and may split UTF-8 sequences.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, AppError>>;

/// Binary compile result; callers verify the content type.
#[derive(Debug, Clone)]
pub struct PdfOutput {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl PdfOutput {
    pub fn is_pdf(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .map(str::trim)
            .is_some_and(|t| t.eq_ignore_ascii_case("application/pdf"))
    }
}

/// Image payload for the image-to-LaTeX endpoint and avatar upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: String,
}

/// Contextual editor actions that stream replacement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformAction {
    FixLatex,
    FixGrammar,
    ReplaceWithX,
}

impl TransformAction {
    pub fn route(self) -> &'static str {
        match self {
            TransformAction::FixLatex => "/llm/fix-latex",
            TransformAction::FixGrammar => "/llm/fix-grammar",
            TransformAction::ReplaceWithX => "/llm/replace-with-x",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransformAction::FixLatex => "Fix LaTeX",
            TransformAction::FixGrammar => "Fix grammar",
            TransformAction::ReplaceWithX => "Replace with X",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub state_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let api_url = env::var("SKOLAMAT_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let state_dir = env::var("SKOLAMAT_STATE_DIR").ok().map(PathBuf::from);
        Self { api_url, state_dir }
    }
}

/// Every REST call the client makes, one method per endpoint.
#[async_trait]
pub trait ApiClient: Send + Sync {
    // auth
    async fn login(&self, req: LoginRequest) -> Result<SessionResponse, AppError>;
    async fn login_google(&self, id_token: &str) -> Result<SessionResponse, AppError>;
    async fn accept_invite(
        &self,
        invite_id: &str,
        req: AcceptInviteRequest,
    ) -> Result<SessionResponse, AppError>;
    async fn accept_invite_google(
        &self,
        invite_id: &str,
        id_token: &str,
    ) -> Result<SessionResponse, AppError>;
    async fn request_password_reset(&self, email: &str) -> Result<(), AppError>;
    async fn confirm_password_reset(&self, req: PasswordResetConfirm) -> Result<(), AppError>;

    // users
    async fn list_users(&self, token: &str) -> Result<Vec<User>, AppError>;
    async fn get_user(&self, token: &str, id: i64) -> Result<User, AppError>;
    async fn update_user(
        &self,
        token: &str,
        id: i64,
        req: UserUpdateRequest,
    ) -> Result<User, AppError>;
    async fn change_password(
        &self,
        token: &str,
        id: i64,
        req: ChangePasswordRequest,
    ) -> Result<(), AppError>;
    async fn set_password(
        &self,
        token: &str,
        id: i64,
        req: SetPasswordRequest,
    ) -> Result<(), AppError>;
    async fn upload_photo(&self, token: &str, id: i64, image: ImageUpload)
        -> Result<User, AppError>;
    async fn delete_photo(&self, token: &str, id: i64) -> Result<User, AppError>;
    async fn update_role(&self, token: &str, id: i64, role: Role) -> Result<User, AppError>;
    async fn send_invite(&self, token: &str, req: InviteRequest) -> Result<(), AppError>;

    // problemsets
    async fn list_problemsets(&self) -> Result<Vec<Problemset>, AppError>;
    async fn get_problemset(&self, id: i64) -> Result<Problemset, AppError>;
    async fn create_problemset(&self, req: NewProblemsetRequest) -> Result<Problemset, AppError>;
    async fn save_draft(&self, id: i64, raw_latex: &str) -> Result<Problemset, AppError>;
    async fn finalize_problemset(&self, id: i64, raw_latex: &str) -> Result<Problemset, AppError>;
    async fn lecture_data(&self, id: i64) -> Result<Problemset, AppError>;
    async fn problemset_pdf(&self, id: i64) -> Result<Vec<u8>, AppError>;
    async fn compile_latex(&self, latex_code: &str) -> Result<PdfOutput, AppError>;

    // problems
    async fn list_problems(&self) -> Result<Vec<Problem>, AppError>;
    async fn problems_with_lecture(&self) -> Result<Vec<ProblemWithLecture>, AppError>;
    async fn search_problems(&self, term: &str) -> Result<Vec<ProblemWithLecture>, AppError>;

    // tags
    async fn list_tags(&self) -> Result<Vec<Tag>, AppError>;
    async fn create_tag(&self, req: NewTagRequest) -> Result<Tag, AppError>;
    async fn delete_tag(&self, id: i64) -> Result<(), AppError>;
    async fn tag_lectures(&self, tag_id: i64) -> Result<Vec<Problemset>, AppError>;
    async fn lecture_tags(&self, lecture_id: i64) -> Result<Vec<Tag>, AppError>;
    async fn set_lecture_tags(&self, lecture_id: i64, tag_ids: &[i64])
        -> Result<Vec<Tag>, AppError>;

    // llm
    async fn transform_latex(
        &self,
        action: TransformAction,
        code: &str,
    ) -> Result<ByteStream, AppError>;
    async fn latex_from_image(&self, image: ImageUpload) -> Result<ByteStream, AppError>;
}

pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns non-2xx responses into `AppError`, reading the backend's
    /// `detail` message when the body carries one.
    async fn check(resp: Response) -> Result<Response, AppError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.detail)
            .unwrap_or(body);
        Err(AppError::from_status(status.as_u16(), message))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let resp = self.client.get(self.url(path)).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn get_json_auth<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
    ) -> Result<T, AppError> {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// POST where only the status matters.
    async fn post_unit<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn stream_response(resp: Response) -> Result<ByteStream, AppError> {
        let resp = Self::check(resp).await?;
        let stream = resp
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(AppError::from));
        Ok(stream.boxed())
    }

    fn image_form(image: ImageUpload) -> Result<multipart::Form, AppError> {
        let part = multipart::Part::bytes(image.bytes)
            .file_name(image.filename)
            .mime_str(&image.mime)
            .map_err(|e| AppError::Malformed(format!("invalid mime type: {e}")))?;
        Ok(multipart::Form::new().part("file", part))
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn login(&self, req: LoginRequest) -> Result<SessionResponse, AppError> {
        self.post_json("/users/login", &req).await
    }

    async fn login_google(&self, id_token: &str) -> Result<SessionResponse, AppError> {
        let req = GoogleTokenRequest {
            id_token: id_token.to_string(),
        };
        self.post_json("/users/login/google", &req).await
    }

    async fn accept_invite(
        &self,
        invite_id: &str,
        req: AcceptInviteRequest,
    ) -> Result<SessionResponse, AppError> {
        self.post_json(&format!("/users/accept-invite/{invite_id}"), &req)
            .await
    }

    async fn accept_invite_google(
        &self,
        invite_id: &str,
        id_token: &str,
    ) -> Result<SessionResponse, AppError> {
        let req = GoogleTokenRequest {
            id_token: id_token.to_string(),
        };
        self.post_json(&format!("/users/accept-invite/google/{invite_id}"), &req)
            .await
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        let req = PasswordResetRequest {
            email: email.to_string(),
        };
        self.post_unit("/users/password-reset-request", &req).await
    }

    async fn confirm_password_reset(&self, req: PasswordResetConfirm) -> Result<(), AppError> {
        self.post_unit("/users/password-reset-confirm", &req).await
    }

    async fn list_users(&self, token: &str) -> Result<Vec<User>, AppError> {
        self.get_json_auth(token, "/users").await
    }

    async fn get_user(&self, token: &str, id: i64) -> Result<User, AppError> {
        self.get_json_auth(token, &format!("/users/{id}")).await
    }

    async fn update_user(
        &self,
        token: &str,
        id: i64,
        req: UserUpdateRequest,
    ) -> Result<User, AppError> {
        let resp = self
            .client
            .put(self.url(&format!("/users/{id}")))
            .bearer_auth(token)
            .json(&req)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn change_password(
        &self,
        token: &str,
        id: i64,
        req: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let resp = self
            .client
            .put(self.url(&format!("/users/{id}/password")))
            .bearer_auth(token)
            .json(&req)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn set_password(
        &self,
        token: &str,
        id: i64,
        req: SetPasswordRequest,
    ) -> Result<(), AppError> {
        let resp = self
            .client
            .post(self.url(&format!("/users/{id}/set-password")))
            .bearer_auth(token)
            .json(&req)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn upload_photo(
        &self,
        token: &str,
        id: i64,
        image: ImageUpload,
    ) -> Result<User, AppError> {
        let form = Self::image_form(image)?;
        let resp = self
            .client
            .post(self.url(&format!("/users/{id}/upload-photo")))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn delete_photo(&self, token: &str, id: i64) -> Result<User, AppError> {
        let resp = self
            .client
            .delete(self.url(&format!("/users/{id}/delete-photo")))
            .bearer_auth(token)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn update_role(&self, token: &str, id: i64, role: Role) -> Result<User, AppError> {
        let resp = self
            .client
            .put(self.url(&format!("/users/{id}/role")))
            .bearer_auth(token)
            .json(&RoleUpdateRequest { role })
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn send_invite(&self, token: &str, req: InviteRequest) -> Result<(), AppError> {
        let resp = self
            .client
            .post(self.url("/users/send-invite"))
            .bearer_auth(token)
            .json(&req)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn list_problemsets(&self) -> Result<Vec<Problemset>, AppError> {
        self.get_json("/problemsets").await
    }

    async fn get_problemset(&self, id: i64) -> Result<Problemset, AppError> {
        self.get_json(&format!("/problemsets/{id}")).await
    }

    async fn create_problemset(&self, req: NewProblemsetRequest) -> Result<Problemset, AppError> {
        self.post_json("/problemsets", &req).await
    }

    async fn save_draft(&self, id: i64, raw_latex: &str) -> Result<Problemset, AppError> {
        let req = DraftRequest {
            raw_latex: raw_latex.to_string(),
        };
        let resp = self
            .client
            .put(self.url(&format!("/problemsets/{id}/draft")))
            .json(&req)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn finalize_problemset(&self, id: i64, raw_latex: &str) -> Result<Problemset, AppError> {
        let req = DraftRequest {
            raw_latex: raw_latex.to_string(),
        };
        let resp = self
            .client
            .put(self.url(&format!("/problemsets/{id}/finalize")))
            .json(&req)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn lecture_data(&self, id: i64) -> Result<Problemset, AppError> {
        self.get_json(&format!("/problemsets/{id}/lecture-data"))
            .await
    }

    async fn problemset_pdf(&self, id: i64) -> Result<Vec<u8>, AppError> {
        let resp = self
            .client
            .get(self.url(&format!("/problemsets/{id}/pdf")))
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn compile_latex(&self, latex_code: &str) -> Result<PdfOutput, AppError> {
        let req = CompileRequest {
            latex_code: latex_code.to_string(),
        };
        let resp = self
            .client
            .post(self.url("/problemsets/compile-latex"))
            .header("Accept", "application/pdf")
            .json(&req)
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = resp.bytes().await?.to_vec();
        Ok(PdfOutput {
            bytes,
            content_type,
        })
    }

    async fn list_problems(&self) -> Result<Vec<Problem>, AppError> {
        self.get_json("/problems").await
    }

    async fn problems_with_lecture(&self) -> Result<Vec<ProblemWithLecture>, AppError> {
        self.get_json("/problems/with-lecture").await
    }

    async fn search_problems(&self, term: &str) -> Result<Vec<ProblemWithLecture>, AppError> {
        self.get_json(&format!("/problems/search/{term}")).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        self.get_json("/tags").await
    }

    async fn create_tag(&self, req: NewTagRequest) -> Result<Tag, AppError> {
        self.post_json("/tags", &req).await
    }

    async fn delete_tag(&self, id: i64) -> Result<(), AppError> {
        let resp = self
            .client
            .delete(self.url(&format!("/tags/{id}")))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn tag_lectures(&self, tag_id: i64) -> Result<Vec<Problemset>, AppError> {
        self.get_json(&format!("/tags/{tag_id}/lectures")).await
    }

    async fn lecture_tags(&self, lecture_id: i64) -> Result<Vec<Tag>, AppError> {
        self.get_json(&format!("/lecture-tags/{lecture_id}")).await
    }

    async fn set_lecture_tags(
        &self,
        lecture_id: i64,
        tag_ids: &[i64],
    ) -> Result<Vec<Tag>, AppError> {
        let req = LectureTagsRequest {
            tag_ids: tag_ids.to_vec(),
        };
        let resp = self
            .client
            .patch(self.url(&format!("/lecture-tags/{lecture_id}")))
            .json(&req)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn transform_latex(
        &self,
        action: TransformAction,
        code: &str,
    ) -> Result<ByteStream, AppError> {
        let req = TransformRequest {
            code: code.to_string(),
        };
        let resp = self
            .client
            .post(self.url(action.route()))
            .json(&req)
            .send()
            .await?;
        Self::stream_response(resp).await
    }

    async fn latex_from_image(&self, image: ImageUpload) -> Result<ByteStream, AppError> {
        let form = Self::image_form(image)?;
        let resp = self
            .client
            .post(self.url("/llm/extract-latex-from-image"))
            .multipart(form)
            .send()
            .await?;
        Self::stream_response(resp).await
    }
}
