use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::domain::{
    normalize_tags, Collection, Comment, LikeOutcome, NewCollection, NewComment, RatingSummary,
    Resource, ResourceDetail, ResourceDraft, ResourceFilter, ResourceView,
};
use super::repository::ResourceRepository;
use super::ResourceError;
use crate::auth::{AccessDenied, Actor};
use crate::ids::{CollectionId, CommentId, ResourceId};
use crate::store::RepositoryError;
use crate::validation::{required_text, ValidationErrors};

const MAX_COMMENT_CHARS: usize = 2000;

pub struct ResourceService<R> {
    repository: Arc<R>,
}

impl<R> ResourceService<R>
where
    R: ResourceRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Anyone may save a draft; publishing needs a verified staff account.
    pub fn create(
        &self,
        actor: &Actor,
        draft: ResourceDraft,
        now: NaiveDateTime,
    ) -> Result<ResourceView, ResourceError> {
        if draft.publish {
            actor.require_verified_staff("publish resources")?;
        }
        let mut errors = ValidationErrors::new();
        let title = required_text(&mut errors, "title", &draft.title, 200);
        let url = draft
            .url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        match url.as_deref() {
            Some(url) => errors.check(
                !(url.starts_with("http://") || url.starts_with("https://")),
                "url",
                "enter a valid URL",
            ),
            None => errors.check(
                draft.kind.requires_url(),
                "url",
                "a URL is required for this kind of resource",
            ),
        }
        errors.into_result()?;

        let resource = self.repository.insert(Resource {
            id: ResourceId::new(),
            owner: actor.user_id,
            title,
            description: draft.description.trim().to_string(),
            kind: draft.kind,
            url,
            tags: normalize_tags(&draft.tags),
            published: draft.publish,
            view_count: 0,
            likes: BTreeSet::new(),
            ratings: BTreeMap::new(),
            created_at: now,
        })?;
        info!(
            resource_id = %resource.id,
            kind = resource.kind.label(),
            published = resource.published,
            "resource created"
        );
        Ok(resource.view())
    }

    /// Published resources plus the viewer's own drafts, newest first.
    pub fn list(
        &self,
        viewer: Option<&Actor>,
        filter: &ResourceFilter,
    ) -> Result<Vec<ResourceView>, ResourceError> {
        let viewer_id = viewer.map(|actor| actor.user_id);
        let mut resources: Vec<Resource> = self
            .repository
            .list()?
            .into_iter()
            .filter(|resource| resource.visible_to(viewer_id.as_ref()))
            .filter(|resource| filter.matches(resource))
            .collect();
        resources.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(resources.iter().map(Resource::view).collect())
    }

    /// Fetch the detail page and count the view.
    pub fn view(
        &self,
        viewer: Option<&Actor>,
        id: &ResourceId,
    ) -> Result<ResourceDetail, ResourceError> {
        self.visible(viewer, id)?;
        let resource = self.modify(id, |resource| resource.view_count += 1)?;
        let mut comments = self.repository.comments_for(id)?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(ResourceDetail {
            resource: resource.view(),
            comments,
        })
    }

    pub fn toggle_like(&self, actor: &Actor, id: &ResourceId) -> Result<LikeOutcome, ResourceError> {
        self.visible(Some(actor), id)?;
        let mut outcome = None;
        self.modify(id, |resource| {
            outcome = Some(resource.toggle_like(actor.user_id));
        })?;
        let outcome = outcome.ok_or(ResourceError::NotFound)?;
        debug!(resource_id = %id, user_id = %actor.user_id, liked = outcome.liked, "like toggled");
        Ok(outcome)
    }

    pub fn rate(
        &self,
        actor: &Actor,
        id: &ResourceId,
        score: u8,
    ) -> Result<RatingSummary, ResourceError> {
        self.visible(Some(actor), id)?;
        let mut outcome = None;
        self.modify(id, |resource| {
            outcome = Some(resource.rate(actor.user_id, score));
        })?;
        let summary = outcome.ok_or(ResourceError::NotFound)??;
        info!(resource_id = %id, score, count = summary.count, "resource rated");
        Ok(summary)
    }

    pub fn comment(
        &self,
        actor: &Actor,
        id: &ResourceId,
        draft: NewComment,
        now: NaiveDateTime,
    ) -> Result<Comment, ResourceError> {
        self.visible(Some(actor), id)?;
        let mut errors = ValidationErrors::new();
        let body = required_text(&mut errors, "body", &draft.body, MAX_COMMENT_CHARS);
        errors.into_result()?;

        let comment = self.repository.insert_comment(Comment {
            id: CommentId::new(),
            resource: *id,
            author: actor.user_id,
            body,
            created_at: now,
        })?;
        info!(resource_id = %id, comment_id = %comment.id, "comment added");
        Ok(comment)
    }

    pub fn create_collection(
        &self,
        actor: &Actor,
        draft: NewCollection,
        now: NaiveDateTime,
    ) -> Result<Collection, ResourceError> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &draft.name, 120);
        errors.into_result()?;

        let collection = self.repository.insert_collection(Collection {
            id: CollectionId::new(),
            owner: actor.user_id,
            name,
            resources: Vec::new(),
            created_at: now,
        })?;
        info!(collection_id = %collection.id, "collection created");
        Ok(collection)
    }

    pub fn collections_for(&self, actor: &Actor) -> Result<Vec<Collection>, ResourceError> {
        let mut collections = self.repository.collections_for(&actor.user_id)?;
        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }

    pub fn add_to_collection(
        &self,
        actor: &Actor,
        collection: &CollectionId,
        resource: &ResourceId,
    ) -> Result<Collection, ResourceError> {
        let mut collection = self.owned_collection(actor, collection)?;
        self.visible(Some(actor), resource)?;
        if collection.add(*resource) {
            self.repository.update_collection(collection.clone())?;
            info!(collection_id = %collection.id, resource_id = %resource, "resource collected");
        }
        Ok(collection)
    }

    pub fn remove_from_collection(
        &self,
        actor: &Actor,
        collection: &CollectionId,
        resource: &ResourceId,
    ) -> Result<Collection, ResourceError> {
        let mut collection = self.owned_collection(actor, collection)?;
        if collection.remove(resource) {
            self.repository.update_collection(collection.clone())?;
            info!(collection_id = %collection.id, resource_id = %resource, "resource uncollected");
        }
        Ok(collection)
    }

    fn owned_collection(
        &self,
        actor: &Actor,
        id: &CollectionId,
    ) -> Result<Collection, ResourceError> {
        let collection = self
            .repository
            .fetch_collection(id)?
            .ok_or(ResourceError::CollectionNotFound)?;
        if collection.owner != actor.user_id {
            return Err(AccessDenied("only the owner may change a collection".to_string()).into());
        }
        Ok(collection)
    }

    /// Drafts are hidden from everyone but their owner.
    fn visible(&self, viewer: Option<&Actor>, id: &ResourceId) -> Result<Resource, ResourceError> {
        let viewer_id = viewer.map(|actor| actor.user_id);
        self.repository
            .fetch(id)?
            .filter(|resource| resource.visible_to(viewer_id.as_ref()))
            .ok_or(ResourceError::NotFound)
    }

    fn modify(
        &self,
        id: &ResourceId,
        mut change: impl FnMut(&mut Resource),
    ) -> Result<Resource, ResourceError> {
        match self.repository.modify(id, &mut change) {
            Ok(resource) => Ok(resource),
            Err(RepositoryError::NotFound) => Err(ResourceError::NotFound),
            Err(other) => Err(other.into()),
        }
    }
}
