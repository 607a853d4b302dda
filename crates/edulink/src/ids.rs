//! Identifier newtypes shared across components.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub Uuid);

            impl $name {
                pub fn new() -> Self {
                    Self(Uuid::new_v4())
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(&self.0, f)
                }
            }

            impl FromStr for $name {
                type Err = uuid::Error;

                fn from_str(raw: &str) -> Result<Self, Self::Err> {
                    Uuid::parse_str(raw.trim()).map(Self)
                }
            }
        )+
    };
}

entity_id!(
    /// Platform account.
    UserId,
    SchoolId,
    DepartmentId,
    ProgramId,
    ReviewId,
    ResourceId,
    CommentId,
    CollectionId,
    CategoryId,
    TopicId,
    PostId,
    SlotId,
    ExceptionId,
    AppointmentId,
    ReminderId,
    AssessmentId,
    QuestionId,
    OptionId,
    AttemptId,
    NotificationId,
    ScheduledReportId,
);
