use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostFields, User};
use crate::error::RepoError;
use crate::filter::PostFilter;
use crate::pagination::{Page, PageRequest};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
///
/// Deleting a user also deletes every post it authored.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by username (exact match).
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository. Posts are always returned with their author resolved.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError>;

    /// Store a new post and return it with its assigned id.
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Replace the writable fields of an existing post.
    /// Fails with [`RepoError::NotFound`] if the id is unknown.
    async fn update(&self, id: i32, fields: PostFields) -> Result<Post, RepoError>;

    /// Fails with [`RepoError::NotFound`] if the id is unknown.
    async fn delete(&self, id: i32) -> Result<(), RepoError>;

    /// Filter, order and paginate the collection.
    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError>;
}
