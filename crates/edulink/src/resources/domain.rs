use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ids::{CollectionId, CommentId, ResourceId, UserId};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Document,
    Video,
    Link,
    Exercise,
    Course,
}

impl ResourceKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Video => "video",
            Self::Link => "link",
            Self::Exercise => "exercise",
            Self::Course => "course",
        }
    }

    /// Links and videos point somewhere; the other kinds may be self-contained.
    pub const fn requires_url(self) -> bool {
        matches!(self, Self::Video | Self::Link)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub owner: UserId,
    pub title: String,
    pub description: String,
    pub kind: ResourceKind,
    pub url: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub view_count: u64,
    pub likes: BTreeSet<UserId>,
    pub ratings: BTreeMap<UserId, u8>,
    pub created_at: NaiveDateTime,
}

impl Resource {
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    /// Add the like when absent, remove it when present.
    pub fn toggle_like(&mut self, user: UserId) -> LikeOutcome {
        let liked = if self.likes.remove(&user) {
            false
        } else {
            self.likes.insert(user);
            true
        };
        LikeOutcome {
            liked,
            like_count: self.like_count(),
        }
    }

    /// Upsert the caller's score.
    pub fn rate(&mut self, user: UserId, score: u8) -> Result<RatingSummary, ValidationErrors> {
        if !(1..=5).contains(&score) {
            return Err(ValidationErrors::single(
                "score",
                "score must be between 1 and 5",
            ));
        }
        self.ratings.insert(user, score);
        Ok(self.rating_summary())
    }

    pub fn rating_summary(&self) -> RatingSummary {
        let count = self.ratings.len();
        let average = if count == 0 {
            None
        } else {
            let total: u32 = self.ratings.values().map(|score| u32::from(*score)).sum();
            Some(total as f32 / count as f32)
        };
        RatingSummary { average, count }
    }

    pub fn visible_to(&self, viewer: Option<&UserId>) -> bool {
        self.published || viewer == Some(&self.owner)
    }

    pub fn view(&self) -> ResourceView {
        ResourceView {
            id: self.id,
            owner: self.owner,
            title: self.title.clone(),
            description: self.description.clone(),
            kind: self.kind,
            url: self.url.clone(),
            tags: self.tags.clone(),
            published: self.published,
            like_count: self.like_count(),
            view_count: self.view_count,
            rating: self.rating_summary(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average: Option<f32>,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub like_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceView {
    pub id: ResourceId,
    pub owner: UserId,
    pub title: String,
    pub description: String,
    pub kind: ResourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub like_count: usize,
    pub view_count: u64,
    pub rating: RatingSummary,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceDetail {
    pub resource: ResourceView,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: ResourceKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceFilter {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub kind: Option<ResourceKind>,
    #[serde(default, rename = "q")]
    pub query: Option<String>,
}

impl ResourceFilter {
    pub fn matches(&self, resource: &Resource) -> bool {
        let tag_matches = self
            .tag
            .as_deref()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .map_or(true, |tag| resource.tags.contains(&tag));
        let kind_matches = self.kind.map_or(true, |kind| resource.kind == kind);
        let query_matches = self
            .query
            .as_deref()
            .map(|query| query.trim().to_lowercase())
            .filter(|query| !query.is_empty())
            .map_or(true, |query| {
                resource.title.to_lowercase().contains(&query)
                    || resource.description.to_lowercase().contains(&query)
            });
        tag_matches && kind_matches && query_matches
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub resource: ResourceId,
    pub author: UserId,
    pub body: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub id: CollectionId,
    pub owner: UserId,
    pub name: String,
    pub resources: Vec<ResourceId>,
    pub created_at: NaiveDateTime,
}

impl Collection {
    /// Returns false when the resource was already collected.
    pub fn add(&mut self, resource: ResourceId) -> bool {
        if self.resources.contains(&resource) {
            return false;
        }
        self.resources.push(resource);
        true
    }

    pub fn remove(&mut self, resource: &ResourceId) -> bool {
        let before = self.resources.len();
        self.resources.retain(|candidate| candidate != resource);
        before != self.resources.len()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCollection {
    pub name: String,
}

/// Lower-case, trim and deduplicate tags, keeping first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    tags.into_iter()
        .map(|tag| tag.as_ref().trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}
