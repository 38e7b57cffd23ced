//! Create the tables from the entity definitions when they are missing.

use sea_orm::{ConnectionTrait, DbConn, DbErr, EntityTrait, Schema};

use super::entity::{post, user};

/// Create `users` then `posts` (with its cascading foreign key) if absent.
pub async fn ensure_schema(db: &DbConn) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    create_if_missing(db, &schema, user::Entity).await?;
    create_if_missing(db, &schema, post::Entity).await?;

    tracing::info!("Database schema ready");
    Ok(())
}

async fn create_if_missing<E: EntityTrait>(db: &DbConn, schema: &Schema, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let table = entity.table_name().to_owned();
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();

    db.execute(backend.build(&stmt)).await?;
    tracing::debug!(%table, "Ensured table exists");
    Ok(())
}
