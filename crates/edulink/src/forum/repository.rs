use super::domain::{Category, Post, Topic};
use crate::ids::{CategoryId, TopicId};
use crate::store::RepositoryError;

pub trait ForumRepository: Send + Sync {
    fn insert_category(&self, category: Category) -> Result<Category, RepositoryError>;
    fn fetch_category(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError>;
    fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;
    fn insert_topic(&self, topic: Topic, opening: Post) -> Result<Topic, RepositoryError>;
    fn update_topic(&self, topic: Topic) -> Result<(), RepositoryError>;
    fn fetch_topic(&self, id: &TopicId) -> Result<Option<Topic>, RepositoryError>;
    fn topics_in(&self, category: &CategoryId) -> Result<Vec<Topic>, RepositoryError>;
    /// Append a reply and bump the topic's activity in one step. Fails with
    /// [`RepositoryError::Conflict`] when the topic is locked at write time.
    fn append_post(&self, post: Post) -> Result<Topic, RepositoryError>;
    fn posts_in(&self, topic: &TopicId) -> Result<Vec<Post>, RepositoryError>;
}
