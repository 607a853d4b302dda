use std::sync::Arc;

use crate::auth::Actor;
use crate::resources::{ResourceDraft, ResourceKind, ResourceService, ResourceView};
use crate::store::memory::MemoryResources;
use crate::testing::at;

pub(super) type Service = ResourceService<MemoryResources>;

pub(super) fn build_service() -> Arc<Service> {
    Arc::new(ResourceService::new(Arc::new(MemoryResources::default())))
}

pub(super) fn draft(title: &str, kind: ResourceKind, publish: bool) -> ResourceDraft {
    ResourceDraft {
        title: title.to_string(),
        description: "Worked examples with solutions".to_string(),
        kind,
        url: kind
            .requires_url()
            .then(|| "https://videos.edulink.test/fractions".to_string()),
        tags: vec!["Math".to_string(), "fractions".to_string()],
        publish,
    }
}

pub(super) fn published(service: &Service, owner: &Actor, title: &str) -> ResourceView {
    service
        .create(owner, draft(title, ResourceKind::Exercise, true), at(1, 6, 9, 0))
        .expect("resource published")
}
