//! In-memory post and user store - used when no database is configured, and in tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{NewPost, Post, PostFields, User};
use blog_core::error::RepoError;
use blog_core::filter::PostFilter;
use blog_core::pagination::{Page, PageRequest};
use blog_core::ports::{BaseRepository, PostRepository, UserRepository};

struct StoredPost {
    author_id: Uuid,
    fields: PostFields,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: BTreeMap<i32, StoredPost>,
    last_post_id: i32,
}

impl Tables {
    fn resolve(&self, id: i32, stored: &StoredPost) -> Option<Post> {
        let author = self.users.get(&stored.author_id)?;
        Some(Post {
            id,
            post_title: stored.fields.post_title.clone(),
            post_content: stored.fields.post_content.clone(),
            author: author.as_author(),
            created_date: stored.fields.created_date,
        })
    }

    fn post(&self, id: i32) -> Option<Post> {
        self.posts
            .get(&id)
            .and_then(|stored| self.resolve(id, stored))
    }
}

/// Users and posts behind one async `RwLock`, so a user delete and its post
/// cascade happen atomically.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;

        let taken = tables
            .users
            .values()
            .any(|u| u.username == user.username && u.id != user.id);
        if taken {
            return Err(RepoError::Constraint(format!(
                "username '{}' already exists",
                user.username
            )));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.posts.retain(|_, post| post.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.post(id))
    }

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(format!(
                "author {} does not exist",
                post.author_id
            )));
        }

        tables.last_post_id += 1;
        let id = tables.last_post_id;
        tables.posts.insert(
            id,
            StoredPost {
                author_id: post.author_id,
                fields: post.fields,
            },
        );

        tables.post(id).ok_or(RepoError::NotFound)
    }

    async fn update(&self, id: i32, fields: PostFields) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;

        let stored = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        stored.fields = fields;

        tables.post(id).ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .posts
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let tables = self.tables.read().await;

        let mut matching: Vec<Post> = tables
            .posts
            .iter()
            .filter_map(|(id, stored)| tables.resolve(*id, stored))
            .filter(|post| filter.matches(post))
            .collect();
        matching.sort_by(|a, b| filter.compare(a, b));

        let count = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();

        Ok(Page::new(items, count, page))
    }
}
