use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::domain::{Category, Moderation, NewCategory, NewPost, NewTopic, Post, Topic, TopicThread};
use super::repository::ForumRepository;
use super::ForumError;
use crate::auth::{AccessDenied, Actor};
use crate::ids::{CategoryId, PostId, TopicId};
use crate::notifications::{notify_best_effort, Notification, NotificationKind, Notifier};
use crate::store::RepositoryError;
use crate::validation::{required_text, ValidationErrors};

const MAX_POST_CHARS: usize = 10_000;

pub struct ForumService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
}

impl<R, N> ForumService<R, N>
where
    R: ForumRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub fn create_category(
        &self,
        actor: &Actor,
        draft: NewCategory,
        now: NaiveDateTime,
    ) -> Result<Category, ForumError> {
        actor.require_admin("create forum categories")?;
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &draft.name, 120);
        let taken = self
            .repository
            .list_categories()?
            .iter()
            .any(|category| category.name.eq_ignore_ascii_case(&name));
        errors.check(taken, "name", "a category with that name already exists");
        errors.into_result()?;

        let category = self.repository.insert_category(Category {
            id: CategoryId::new(),
            name,
            description: draft.description.trim().to_string(),
            created_at: now,
        })?;
        info!(category_id = %category.id, "forum category created");
        Ok(category)
    }

    pub fn categories(&self) -> Result<Vec<Category>, ForumError> {
        let mut categories = self.repository.list_categories()?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    /// Open a topic together with its first post.
    pub fn create_topic(
        &self,
        actor: &Actor,
        category: &CategoryId,
        draft: NewTopic,
        now: NaiveDateTime,
    ) -> Result<TopicThread, ForumError> {
        self.repository
            .fetch_category(category)?
            .ok_or(ForumError::CategoryNotFound)?;
        let mut errors = ValidationErrors::new();
        let title = required_text(&mut errors, "title", &draft.title, 200);
        let body = required_text(&mut errors, "body", &draft.body, MAX_POST_CHARS);
        errors.into_result()?;

        let topic = Topic {
            id: TopicId::new(),
            category: *category,
            author: actor.user_id,
            title,
            locked: false,
            pinned: false,
            created_at: now,
            last_activity_at: now,
        };
        let opening = Post {
            id: PostId::new(),
            topic: topic.id,
            author: actor.user_id,
            body,
            created_at: now,
        };
        let topic = self.repository.insert_topic(topic, opening.clone())?;
        info!(topic_id = %topic.id, category_id = %category, "topic opened");
        Ok(TopicThread {
            topic,
            posts: vec![opening],
        })
    }

    pub fn reply(
        &self,
        actor: &Actor,
        topic: &TopicId,
        draft: NewPost,
        now: NaiveDateTime,
    ) -> Result<Post, ForumError> {
        let current = self.load_topic(topic)?;
        if current.locked {
            debug!(topic_id = %topic, "reply rejected: topic locked");
            return Err(ForumError::Locked);
        }
        let mut errors = ValidationErrors::new();
        let body = required_text(&mut errors, "body", &draft.body, MAX_POST_CHARS);
        errors.into_result()?;

        let post = Post {
            id: PostId::new(),
            topic: *topic,
            author: actor.user_id,
            body,
            created_at: now,
        };
        let updated = match self.repository.append_post(post.clone()) {
            Ok(updated) => updated,
            Err(RepositoryError::Conflict) => return Err(ForumError::Locked),
            Err(RepositoryError::NotFound) => return Err(ForumError::TopicNotFound),
            Err(other) => return Err(other.into()),
        };
        info!(topic_id = %topic, post_id = %post.id, "reply posted");

        if updated.author != actor.user_id {
            notify_best_effort(
                self.notifier.as_ref(),
                Notification::new(
                    updated.author,
                    NotificationKind::Forum,
                    format!("New reply in \"{}\"", updated.title),
                    now,
                ),
            );
        }
        Ok(post)
    }

    /// Lock or pin a topic; staff only.
    pub fn moderate(
        &self,
        actor: &Actor,
        topic: &TopicId,
        moderation: Moderation,
    ) -> Result<Topic, ForumError> {
        if !actor.role.is_staff() {
            return Err(AccessDenied("only staff may moderate topics".to_string()).into());
        }
        let mut current = self.load_topic(topic)?;
        if let Some(locked) = moderation.locked {
            current.locked = locked;
        }
        if let Some(pinned) = moderation.pinned {
            current.pinned = pinned;
        }
        self.repository.update_topic(current.clone())?;
        info!(
            topic_id = %topic,
            locked = current.locked,
            pinned = current.pinned,
            moderator = %actor.user_id,
            "topic moderated"
        );
        Ok(current)
    }

    pub fn set_locked(&self, actor: &Actor, topic: &TopicId, locked: bool) -> Result<Topic, ForumError> {
        self.moderate(
            actor,
            topic,
            Moderation {
                locked: Some(locked),
                pinned: None,
            },
        )
    }

    pub fn set_pinned(&self, actor: &Actor, topic: &TopicId, pinned: bool) -> Result<Topic, ForumError> {
        self.moderate(
            actor,
            topic,
            Moderation {
                locked: None,
                pinned: Some(pinned),
            },
        )
    }

    pub fn list_topics(&self, category: &CategoryId) -> Result<Vec<Topic>, ForumError> {
        self.repository
            .fetch_category(category)?
            .ok_or(ForumError::CategoryNotFound)?;
        let mut topics = self.repository.topics_in(category)?;
        topics.sort_by(Topic::listing_order);
        Ok(topics)
    }

    pub fn topic_thread(&self, topic: &TopicId) -> Result<TopicThread, ForumError> {
        let topic = self.load_topic(topic)?;
        let mut posts = self.repository.posts_in(&topic.id)?;
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(TopicThread { topic, posts })
    }

    fn load_topic(&self, id: &TopicId) -> Result<Topic, ForumError> {
        self.repository
            .fetch_topic(id)?
            .ok_or(ForumError::TopicNotFound)
    }
}
