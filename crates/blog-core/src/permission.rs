//! Write permissions for posts.
//!
//! Reads are open to everyone. Writes need an authenticated actor at the
//! collection level and ownership at the object level. The actor is always
//! passed in explicitly.

use uuid::Uuid;

use crate::domain::Post;
use crate::error::DomainError;

/// How a request touches a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Safe, read-only methods.
    Read,
    Write,
}

impl Access {
    /// Classify an HTTP method name. GET, HEAD and OPTIONS are safe.
    pub fn from_method(method: &str) -> Self {
        match method {
            "GET" | "HEAD" | "OPTIONS" => Access::Read,
            _ => Access::Write,
        }
    }

    pub fn is_safe(self) -> bool {
        self == Access::Read
    }
}

/// Collection-level check: authenticated, or read-only.
pub fn has_permission(access: Access, actor: Option<Uuid>) -> bool {
    access.is_safe() || actor.is_some()
}

/// Object-level check: owner, or read-only.
pub fn has_object_permission(access: Access, actor: Option<Uuid>, post: &Post) -> bool {
    if access.is_safe() {
        return true;
    }
    actor.is_some_and(|id| post.is_owned_by(id))
}

/// Run the collection-level check, then the object-level one when a post is given.
pub fn authorize(access: Access, actor: Option<Uuid>, post: Option<&Post>) -> Result<(), DomainError> {
    if !has_permission(access, actor) {
        return Err(DomainError::Forbidden);
    }
    match post {
        Some(post) if !has_object_permission(access, actor, post) => Err(DomainError::Forbidden),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::Author;

    fn post_by(owner: Uuid) -> Post {
        Post {
            id: 1,
            post_title: "test post".to_string(),
            post_content: "howdy howdy howdy".to_string(),
            author: Author {
                id: owner,
                username: "user_a".to_string(),
            },
            created_date: NaiveDate::from_ymd_opt(2004, 8, 24).unwrap(),
        }
    }

    #[test]
    fn test_method_classification() {
        assert_eq!(Access::from_method("GET"), Access::Read);
        assert_eq!(Access::from_method("HEAD"), Access::Read);
        assert_eq!(Access::from_method("OPTIONS"), Access::Read);
        assert_eq!(Access::from_method("POST"), Access::Write);
        assert_eq!(Access::from_method("PUT"), Access::Write);
        assert_eq!(Access::from_method("DELETE"), Access::Write);
    }

    #[test]
    fn test_reads_always_allowed() {
        let post = post_by(Uuid::new_v4());

        assert!(authorize(Access::Read, None, Some(&post)).is_ok());
        assert!(authorize(Access::Read, Some(Uuid::new_v4()), Some(&post)).is_ok());
        assert!(authorize(Access::Read, None, None).is_ok());
    }

    #[test]
    fn test_anonymous_write_forbidden() {
        let post = post_by(Uuid::new_v4());

        assert!(matches!(
            authorize(Access::Write, None, None),
            Err(DomainError::Forbidden)
        ));
        assert!(matches!(
            authorize(Access::Write, None, Some(&post)),
            Err(DomainError::Forbidden)
        ));
    }

    #[test]
    fn test_authenticated_create_allowed() {
        assert!(authorize(Access::Write, Some(Uuid::new_v4()), None).is_ok());
    }

    #[test]
    fn test_owner_only_writes() {
        let owner = Uuid::new_v4();
        let post = post_by(owner);

        assert!(authorize(Access::Write, Some(owner), Some(&post)).is_ok());
        assert!(matches!(
            authorize(Access::Write, Some(Uuid::new_v4()), Some(&post)),
            Err(DomainError::Forbidden)
        ));
    }
}
