use std::sync::Arc;

use crate::accounts::Role;
use crate::auth::Actor;
use crate::forum::{Category, ForumService, NewCategory, NewTopic, TopicThread};
use crate::notifications::NotificationCenter;
use crate::store::memory::MemoryForum;
use crate::testing::{actor, at};

pub(super) type Service = ForumService<MemoryForum, NotificationCenter>;

pub(super) struct Fixture {
    pub(super) service: Arc<Service>,
    pub(super) forum: Arc<MemoryForum>,
    pub(super) inbox: Arc<NotificationCenter>,
}

pub(super) fn build_fixture() -> Fixture {
    let forum = Arc::new(MemoryForum::default());
    let inbox = Arc::new(NotificationCenter::default());
    let service = Arc::new(ForumService::new(forum.clone(), inbox.clone()));
    Fixture {
        service,
        forum,
        inbox,
    }
}

pub(super) fn category(service: &Service, name: &str) -> Category {
    service
        .create_category(
            &actor(Role::Administrator),
            NewCategory {
                name: name.to_string(),
                description: String::new(),
            },
            at(1, 5, 8, 0),
        )
        .expect("category created")
}

pub(super) fn open_topic(
    service: &Service,
    author: &Actor,
    category: &Category,
    title: &str,
    day: u32,
) -> TopicThread {
    service
        .create_topic(
            author,
            &category.id,
            NewTopic {
                title: title.to_string(),
                body: "Which programme should I pick after the baccalauréat?".to_string(),
            },
            at(1, day, 9, 0),
        )
        .expect("topic opened")
}
