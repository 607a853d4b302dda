use super::common::*;
use crate::accounts::Role;
use crate::resources::{NewCollection, NewComment, ResourceError, ResourceFilter, ResourceKind};
use crate::testing::{actor, at, unverified};

#[test]
fn publishing_needs_verified_staff() {
    let service = build_service();
    let error = service
        .create(&actor(Role::Student), draft("Notes", ResourceKind::Document, true), at(1, 6, 9, 0))
        .expect_err("students cannot publish");
    assert!(matches!(error, ResourceError::Forbidden(_)));

    let error = service
        .create(&unverified(Role::Teacher), draft("Notes", ResourceKind::Document, true), at(1, 6, 9, 0))
        .expect_err("unverified teachers cannot publish");
    assert!(matches!(error, ResourceError::Forbidden(_)));

    let saved = service
        .create(&actor(Role::Student), draft("Notes", ResourceKind::Document, false), at(1, 6, 9, 0))
        .expect("drafts are open to everyone");
    assert!(!saved.published);
    assert_eq!(saved.tags, vec!["math".to_string(), "fractions".to_string()]);
}

#[test]
fn links_and_videos_need_a_url() {
    let service = build_service();
    let mut link = draft("Khan Academy", ResourceKind::Link, true);
    link.url = None;
    let error = service
        .create(&actor(Role::Teacher), link, at(1, 6, 9, 0))
        .expect_err("url required");
    assert!(matches!(error, ResourceError::Validation(ref errors) if errors.has("url")));
}

#[test]
fn drafts_are_listed_only_for_their_owner() {
    let service = build_service();
    let teacher = actor(Role::Teacher);
    let student = actor(Role::Student);
    published(&service, &teacher, "Fractions");
    service
        .create(&student, draft("My draft", ResourceKind::Document, false), at(1, 7, 9, 0))
        .expect("draft saved");

    assert_eq!(service.list(None, &ResourceFilter::default()).expect("list").len(), 1);
    let own = service.list(Some(&student), &ResourceFilter::default()).expect("list");
    assert_eq!(own.len(), 2);
    assert_eq!(own[0].title, "My draft", "newest first");

    let filtered = service
        .list(
            None,
            &ResourceFilter {
                tag: Some("MATH".to_string()),
                kind: Some(ResourceKind::Exercise),
                query: Some("fraction".to_string()),
            },
        )
        .expect("list");
    assert_eq!(filtered.len(), 1);
}

#[test]
fn toggling_a_like_twice_restores_the_count() {
    let service = build_service();
    let resource = published(&service, &actor(Role::Teacher), "Fractions");
    let reader = actor(Role::Pupil);

    let liked = service.toggle_like(&reader, &resource.id).expect("like");
    assert!(liked.liked);
    assert_eq!(liked.like_count, 1);

    let unliked = service.toggle_like(&reader, &resource.id).expect("unlike");
    assert!(!unliked.liked);
    assert_eq!(unliked.like_count, 0);
}

#[test]
fn ratings_are_one_per_user_and_views_are_counted() {
    let service = build_service();
    let resource = published(&service, &actor(Role::Teacher), "Fractions");
    let first = actor(Role::Student);
    let second = actor(Role::Pupil);

    service.rate(&first, &resource.id, 2).expect("rate");
    service.rate(&first, &resource.id, 4).expect("re-rate");
    let summary = service.rate(&second, &resource.id, 5).expect("rate");
    assert_eq!(summary.count, 2);
    assert_eq!(summary.average, Some(4.5));

    service.view(None, &resource.id).expect("view");
    let detail = service.view(Some(&first), &resource.id).expect("view");
    assert_eq!(detail.resource.view_count, 2);
}

#[test]
fn drafts_are_hidden_from_other_users() {
    let service = build_service();
    let owner = actor(Role::Teacher);
    let hidden = service
        .create(&owner, draft("Unfinished", ResourceKind::Course, false), at(1, 6, 9, 0))
        .expect("draft");

    let error = service
        .toggle_like(&actor(Role::Student), &hidden.id)
        .expect_err("hidden draft");
    assert!(matches!(error, ResourceError::NotFound));
    service.view(Some(&owner), &hidden.id).expect("owner sees the draft");
}

#[test]
fn comments_are_returned_oldest_first() {
    let service = build_service();
    let resource = published(&service, &actor(Role::Teacher), "Fractions");
    let reader = actor(Role::Student);
    service
        .comment(&reader, &resource.id, NewComment { body: "first".to_string() }, at(1, 7, 9, 0))
        .expect("comment");
    service
        .comment(&reader, &resource.id, NewComment { body: "second".to_string() }, at(1, 8, 9, 0))
        .expect("comment");
    let error = service
        .comment(&reader, &resource.id, NewComment { body: "   ".to_string() }, at(1, 8, 9, 0))
        .expect_err("blank comment");
    assert!(matches!(error, ResourceError::Validation(_)));

    let detail = service.view(Some(&reader), &resource.id).expect("detail");
    let bodies: Vec<&str> = detail.comments.iter().map(|comment| comment.body.as_str()).collect();
    assert_eq!(bodies, vec!["first", "second"]);
}

#[test]
fn collections_belong_to_their_owner() {
    let service = build_service();
    let resource = published(&service, &actor(Role::Teacher), "Fractions");
    let owner = actor(Role::Student);
    let collection = service
        .create_collection(&owner, NewCollection { name: "Revision".to_string() }, at(1, 7, 9, 0))
        .expect("collection");

    service
        .add_to_collection(&owner, &collection.id, &resource.id)
        .expect("added");
    let again = service
        .add_to_collection(&owner, &collection.id, &resource.id)
        .expect("adding twice is a no-op");
    assert_eq!(again.resources.len(), 1);

    let error = service
        .add_to_collection(&actor(Role::Student), &collection.id, &resource.id)
        .expect_err("not the owner");
    assert!(matches!(error, ResourceError::Forbidden(_)));

    let emptied = service
        .remove_from_collection(&owner, &collection.id, &resource.id)
        .expect("removed");
    assert!(emptied.resources.is_empty());
    assert_eq!(service.collections_for(&owner).expect("collections").len(), 1);
}
