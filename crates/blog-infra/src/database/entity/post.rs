//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;

use blog_core::domain::{Author, Post};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub post_title: String,
    #[sea_orm(column_type = "Text")]
    pub post_content: String,
    pub author_id: Uuid,
    pub created_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Combine a post row with its author row.
    pub fn into_domain(self, author: super::user::Model) -> Post {
        Post {
            id: self.id,
            post_title: self.post_title,
            post_content: self.post_content,
            author: Author {
                id: author.id,
                username: author.username,
            },
            created_date: self.created_date,
        }
    }
}
