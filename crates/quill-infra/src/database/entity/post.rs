//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::CoverImage;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub author_id: Option<Uuid>,
    pub cover_image_key: Option<String>,
    pub cover_image_filename: Option<String>,
    pub cover_image_content_type: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for quill_core::domain::Post {
    fn from(model: Model) -> Self {
        // All three columns are written together; a partial row reads as
        // no attachment.
        let cover_image = match (
            model.cover_image_key,
            model.cover_image_filename,
            model.cover_image_content_type,
        ) {
            (Some(key), Some(filename), Some(content_type)) => Some(CoverImage {
                key,
                filename,
                content_type,
            }),
            _ => None,
        };

        Self {
            id: model.id,
            title: model.title,
            body: model.body,
            published_at: model.published_at.map(Into::into),
            author_id: model.author_id,
            cover_image,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<quill_core::domain::Post> for ActiveModel {
    fn from(post: quill_core::domain::Post) -> Self {
        let (key, filename, content_type) = match post.cover_image {
            Some(image) => (
                Some(image.key),
                Some(image.filename),
                Some(image.content_type),
            ),
            None => (None, None, None),
        };

        Self {
            id: Set(post.id),
            title: Set(post.title),
            body: Set(post.body),
            published_at: Set(post.published_at.map(Into::into)),
            author_id: Set(post.author_id),
            cover_image_key: Set(key),
            cover_image_filename: Set(filename),
            cover_image_content_type: Set(content_type),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
