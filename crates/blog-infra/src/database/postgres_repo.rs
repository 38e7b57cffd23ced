//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbConn, DbErr, EntityTrait,
    IntoActiveModel, NotSet, Order, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

use blog_core::domain::{NewPost, Post, PostFields, User};
use blog_core::error::RepoError;
use blog_core::filter::{Direction, PostFilter, SortField};
use blog_core::pagination::{Page, PageRequest};
use blog_core::ports::{BaseRepository, PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

type PostRow = (post::Model, Option<user::Model>);

pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => return RepoError::Constraint(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => return RepoError::Constraint(msg),
        _ => {}
    }
    match err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let exists = UserEntity::find_by_id(user.id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .is_some();

        let mut active_model: user::ActiveModel = user.into();
        let model = if exists {
            active_model.updated_at = Set(Utc::now().into());
            active_model.update(&self.db).await
        } else {
            active_model.insert(&self.db).await
        }
        .map_err(map_db_err)?;

        Ok(model.into())
    }

    /// Posts go with the user through `ON DELETE CASCADE`.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        tracing::debug!(user_id = %id, "Deleted user and their posts");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

/// PostgreSQL post repository. Every read joins the author row.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn with_author() -> sea_orm::SelectTwo<PostEntity, UserEntity> {
    PostEntity::find().find_also_related(UserEntity)
}

fn into_post((post, author): PostRow) -> Result<Post, RepoError> {
    let author = author.ok_or_else(|| RepoError::Query(format!("post {} has no author", post.id)))?;
    Ok(post.into_domain(author))
}

async fn load<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Post>, RepoError> {
    let row = with_author()
        .filter(post::Column::Id.eq(id))
        .one(db)
        .await
        .map_err(map_db_err)?;

    row.map(into_post).transpose()
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `lower(column) LIKE '%needle%'`. The needle is already lowercase.
fn icontains(column: impl IntoColumnRef, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(format!("%{}%", escape_like(needle))).escape('\\'))
}

/// Translate a [`PostFilter`] into a WHERE clause over `posts` joined with `users`.
pub(crate) fn post_condition(filter: &PostFilter) -> Condition {
    let title = (PostEntity, post::Column::PostTitle);
    let content = (PostEntity, post::Column::PostContent);
    let username = (UserEntity, user::Column::Username);

    let mut condition = Condition::all();

    if let Some(needle) = &filter.post_title {
        condition = condition.add(icontains(title, needle));
    }
    if let Some(needle) = &filter.author_username {
        condition = condition.add(icontains(username, needle));
    }
    if let Some(date) = filter.created_date {
        condition = condition.add(post::Column::CreatedDate.eq(date));
    }
    for term in &filter.search_terms {
        condition = condition.add(
            Condition::any()
                .add(icontains(title, term))
                .add(icontains(content, term))
                .add(icontains(username, term)),
        );
    }

    condition
}

pub(crate) fn filtered_query(filter: &PostFilter) -> sea_orm::SelectTwo<PostEntity, UserEntity> {
    let mut select = with_author().filter(post_condition(filter));

    for key in &filter.ordering {
        // Titles sort case-insensitively, independent of the database collation.
        let column: SimpleExpr = match key.field {
            SortField::CreatedDate => Expr::col((PostEntity, post::Column::CreatedDate)).into(),
            SortField::PostTitle => {
                Func::lower(Expr::col((PostEntity, post::Column::PostTitle))).into()
            }
        };
        let order = match key.direction {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        };
        select = select.order_by(column, order);
    }

    select.order_by(post::Column::Id, Order::Desc)
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        load(&self.db, id).await
    }

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = post::ActiveModel {
            id: NotSet,
            post_title: Set(post.fields.post_title),
            post_content: Set(post.fields.post_content),
            author_id: Set(post.author_id),
            created_date: Set(post.fields.created_date),
        }
        .insert(&txn)
        .await
        .map_err(map_db_err)?;

        let stored = load(&txn, model.id).await?.ok_or(RepoError::NotFound)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(post_id = stored.id, author = %stored.author.username, "Inserted post");
        Ok(stored)
    }

    async fn update(&self, id: i32, fields: PostFields) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let existing = PostEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut active_model = existing.into_active_model();
        active_model.post_title = Set(fields.post_title);
        active_model.post_content = Set(fields.post_content);
        active_model.created_date = Set(fields.created_date);
        active_model.update(&txn).await.map_err(map_db_err)?;

        let updated = load(&txn, id).await?.ok_or(RepoError::NotFound)?;
        txn.commit().await.map_err(map_db_err)?;

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let paginator = filtered_query(filter).paginate(&self.db, page.page_size);

        let count = paginator.num_items().await.map_err(map_db_err)?;
        let empty = Page::new(Vec::new(), count, page);
        if empty.is_out_of_range() {
            // The offset of a page past the end may not even fit in a u64.
            return Ok(empty);
        }

        let rows = paginator
            .fetch_page(page.page - 1)
            .await
            .map_err(map_db_err)?;

        let items = rows
            .into_iter()
            .map(into_post)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, count, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
