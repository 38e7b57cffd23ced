use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The user a post belongs to, as seen from the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
}

/// Post entity - a blog post owned by the user who created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub post_title: String,
    pub post_content: String,
    pub author: Author,
    pub created_date: NaiveDate,
}

impl Post {
    /// Whether `user_id` is the owner of this post.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.author.id == user_id
    }

    /// The client-writable fields as currently stored.
    pub fn fields(&self) -> PostFields {
        PostFields {
            post_title: self.post_title.clone(),
            post_content: self.post_content.clone(),
            created_date: self.created_date,
        }
    }
}

/// The client-writable fields of a post, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    pub post_title: String,
    pub post_content: String,
    pub created_date: NaiveDate,
}

/// A post waiting to be stored. Storage assigns the id.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub fields: PostFields,
}

impl NewPost {
    pub fn new(author_id: Uuid, fields: PostFields) -> Self {
        Self { author_id, fields }
    }
}
