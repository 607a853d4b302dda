use super::domain::{Collection, Comment, Resource};
use crate::ids::{CollectionId, ResourceId, UserId};
use crate::store::RepositoryError;

/// Storage abstraction for the resource library.
pub trait ResourceRepository: Send + Sync {
    fn insert(&self, resource: Resource) -> Result<Resource, RepositoryError>;
    fn fetch(&self, id: &ResourceId) -> Result<Option<Resource>, RepositoryError>;
    fn list(&self) -> Result<Vec<Resource>, RepositoryError>;
    /// Apply `change` to the stored resource under the store lock so concurrent
    /// likes, ratings and views are never lost.
    fn modify(
        &self,
        id: &ResourceId,
        change: &mut dyn FnMut(&mut Resource),
    ) -> Result<Resource, RepositoryError>;
    fn insert_comment(&self, comment: Comment) -> Result<Comment, RepositoryError>;
    fn comments_for(&self, resource: &ResourceId) -> Result<Vec<Comment>, RepositoryError>;
    fn insert_collection(&self, collection: Collection) -> Result<Collection, RepositoryError>;
    fn update_collection(&self, collection: Collection) -> Result<(), RepositoryError>;
    fn fetch_collection(&self, id: &CollectionId) -> Result<Option<Collection>, RepositoryError>;
    fn collections_for(&self, owner: &UserId) -> Result<Vec<Collection>, RepositoryError>;
}
