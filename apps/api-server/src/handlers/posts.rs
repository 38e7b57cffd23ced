//! Post resource: list, retrieve, create, update and delete.
//!
//! Every handler receives the caller as an explicit [`OptionalIdentity`].
//! Anonymous callers can read. Only authenticated callers can create, and
//! only the author can update or delete. An unknown id is a 404 for every
//! caller, because the post is looked up before permissions are checked.
//! A token whose account no longer exists acts as anonymous.

use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use blog_core::domain::{NewPost, Post};
use blog_core::error::DomainError;
use blog_core::filter::{FilterParams, PostFilter};
use blog_core::pagination::Page;
use blog_core::permission::{self, Access};
use blog_core::validation::{PostInput, validate_post, validate_post_patch};
use blog_shared::dto::{Paginated, PostListQuery, PostRequest, PostResponse};

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn render(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        post_title: post.post_title,
        post_content: post.post_content,
        author: post.author.username,
        created_date: post.created_date,
    }
}

/// Parse the body only once permissions are settled, so an anonymous caller
/// gets 403 even for a malformed body.
fn parse_body(body: &[u8]) -> AppResult<PostRequest> {
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("JSON parse error - {e}")))
}

fn as_input(req: &PostRequest) -> PostInput<'_> {
    PostInput {
        post_title: req.post_title.as_deref(),
        post_content: req.post_content.as_deref(),
        created_date: req.created_date.as_deref(),
    }
}

async fn find_post(state: &AppState, id: i32) -> AppResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::post_not_found(id).into())
}

/// The caller's user id, provided the account behind the token still exists.
async fn resolve_actor(state: &AppState, identity: &OptionalIdentity) -> AppResult<Option<Uuid>> {
    let Some(user_id) = identity.user_id() else {
        return Ok(None);
    };

    let user = state.users.find_by_id(user_id).await?;
    if user.is_none() {
        tracing::debug!(%user_id, "Token refers to a deleted account");
    }
    Ok(user.map(|user| user.id))
}

fn access(req: &HttpRequest) -> Access {
    Access::from_method(req.method().as_str())
}

/// Absolute URL of the current request with `page` replaced.
fn page_link(req: &HttpRequest, page: u64) -> String {
    let mut pairs: Vec<(String, String)> =
        web::Query::<Vec<(String, String)>>::from_query(req.query_string())
            .map(web::Query::into_inner)
            .unwrap_or_default();
    pairs.retain(|(key, _)| key != "page");
    pairs.push(("page".to_string(), page.to_string()));

    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let info = req.connection_info();
    format!("{}://{}{}?{}", info.scheme(), info.host(), req.path(), query)
}

fn paginate(req: &HttpRequest, page: Page<Post>) -> Paginated<PostResponse> {
    let next = page.has_next().then(|| page_link(req, page.request.page + 1));
    let previous = page
        .has_previous()
        .then(|| page_link(req, page.request.page - 1));
    let page = page.map(render);

    Paginated {
        count: page.count,
        next,
        previous,
        results: page.items,
    }
}

/// GET /api/posts
pub async fn list_posts(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();

    let filter = PostFilter::from_params(&FilterParams {
        post_title: query.post_title.as_deref(),
        author_username: query.author_username.as_deref(),
        created_date: query.created_date.as_deref(),
        search: query.search.as_deref(),
        ordering: query.ordering.as_deref(),
    })?;
    let page_request = state
        .pagination
        .page_request(query.page.as_deref(), query.page_size.as_deref())
        .ok_or_else(|| AppError::NotFound("Invalid page.".to_string()))?;

    let page = state.posts.list(&filter, page_request).await?;
    if page.is_out_of_range() {
        return Err(AppError::NotFound("Invalid page.".to_string()));
    }

    Ok(HttpResponse::Ok().json(paginate(&req, page)))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(render(post)))
}

/// POST /api/posts
///
/// The author is always the caller; an `author` field in the body is ignored.
pub async fn create_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let actor = resolve_actor(&state, &identity).await?;
    permission::authorize(access(&req), actor, None)?;
    let author_id = actor.ok_or(AppError::Forbidden)?;

    let request = parse_body(&body)?;
    let fields = validate_post(&as_input(&request))?;

    let post = state.posts.insert(NewPost::new(author_id, fields)).await?;
    tracing::info!(post_id = post.id, author = %post.author.username, "Post created");

    Ok(HttpResponse::Created().json(render(post)))
}

/// How an update treats fields missing from the body.
#[derive(Debug, Clone, Copy)]
enum UpdateMode {
    /// PUT: every field is required.
    Replace,
    /// PATCH: missing fields keep their stored value.
    Merge,
}

async fn apply_update(
    req: &HttpRequest,
    state: &AppState,
    identity: &OptionalIdentity,
    id: i32,
    body: &[u8],
    mode: UpdateMode,
) -> AppResult<HttpResponse> {
    let existing = find_post(state, id).await?;
    let actor = resolve_actor(state, identity).await?;
    permission::authorize(access(req), actor, Some(&existing))?;

    let request = parse_body(body)?;
    let input = as_input(&request);
    let fields = match mode {
        UpdateMode::Replace => validate_post(&input)?,
        UpdateMode::Merge => validate_post_patch(&input, &existing.fields())?,
    };

    let post = state.posts.update(id, fields).await?;
    tracing::info!(post_id = id, ?mode, "Post updated");

    Ok(HttpResponse::Ok().json(render(post)))
}

/// PUT /api/posts/{id} - full replacement of title, content and date.
pub async fn update_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<i32>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    apply_update(&req, &state, &identity, path.into_inner(), &body, UpdateMode::Replace).await
}

/// PATCH /api/posts/{id} - changes only the fields present in the body.
pub async fn partial_update_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<i32>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    apply_update(&req, &state, &identity, path.into_inner(), &body, UpdateMode::Merge).await
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let existing = find_post(&state, id).await?;
    let actor = resolve_actor(&state, &identity).await?;
    permission::authorize(access(&req), actor, Some(&existing))?;

    state.posts.delete(id).await?;
    tracing::info!(post_id = id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}
