use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, PostId, TopicId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub id: TopicId,
    pub category: CategoryId,
    pub author: UserId,
    pub title: String,
    pub locked: bool,
    pub pinned: bool,
    pub created_at: NaiveDateTime,
    pub last_activity_at: NaiveDateTime,
}

impl Topic {
    /// Pinned topics first, then most recent activity.
    pub fn listing_order(a: &Topic, b: &Topic) -> Ordering {
        b.pinned
            .cmp(&a.pinned)
            .then_with(|| b.last_activity_at.cmp(&a.last_activity_at))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub topic: TopicId,
    pub author: UserId,
    pub body: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicThread {
    pub topic: Topic,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTopic {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub body: String,
}

/// Moderator switches; absent fields stay unchanged.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Moderation {
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default)]
    pub pinned: Option<bool>,
}
