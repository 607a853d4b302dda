//! Mutex-guarded in-memory repositories backing the HTTP service, the CLI
//! demo and the tests.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};

use super::{lock, RepositoryError};
use crate::accounts::{AccountRepository, User};
use crate::analytics::{ScheduledReport, ScheduledReportRepository};
use crate::appointments::{
    Appointment, AppointmentException, AppointmentReminder, AppointmentRepository,
    AppointmentSlot, AppointmentStatus,
};
use crate::forum::{Category, ForumRepository, Post, Topic};
use crate::ids::{
    AppointmentId, AssessmentId, CategoryId, CollectionId, ReminderId, ResourceId, SchoolId,
    ScheduledReportId, SlotId, TopicId, UserId,
};
use crate::orientation::{Assessment, Attempt, OrientationRepository};
use crate::resources::{Collection, Comment, Resource, ResourceRepository};
use crate::schools::{Department, Program, Review, School, SchoolRepository};

fn replace<T, F>(items: &mut [T], item: T, same: F) -> Result<(), RepositoryError>
where
    F: Fn(&T, &T) -> bool,
{
    let slot = items
        .iter_mut()
        .find(|existing| same(existing, &item))
        .ok_or(RepositoryError::NotFound)?;
    *slot = item;
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct MemoryAccounts {
    users: Arc<Mutex<Vec<User>>>,
}

impl AccountRepository for MemoryAccounts {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut guard = lock(&self.users, "account")?;
        let clash = guard.iter().any(|existing| {
            existing.id == user.id
                || existing.username.eq_ignore_ascii_case(&user.username)
                || existing.email.eq_ignore_ascii_case(&user.email)
        });
        if clash {
            return Err(RepositoryError::Conflict);
        }
        guard.push(user.clone());
        Ok(user)
    }

    fn update(&self, user: User) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.users, "account")?;
        replace(&mut guard, user, |a, b| a.id == b.id)
    }

    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let guard = lock(&self.users, "account")?;
        Ok(guard.iter().find(|user| user.id == *id).cloned())
    }

    fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        let login = login.trim();
        let guard = lock(&self.users, "account")?;
        Ok(guard
            .iter()
            .find(|user| {
                user.username.eq_ignore_ascii_case(login) || user.email.eq_ignore_ascii_case(login)
            })
            .cloned())
    }

    fn taken(&self, username: &str, email: &str) -> Result<(bool, bool), RepositoryError> {
        let guard = lock(&self.users, "account")?;
        let username_taken = guard
            .iter()
            .any(|user| user.username.eq_ignore_ascii_case(username.trim()));
        let email_taken = guard
            .iter()
            .any(|user| user.email.eq_ignore_ascii_case(email.trim()));
        Ok((username_taken, email_taken))
    }

    fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(lock(&self.users, "account")?.clone())
    }
}

#[derive(Debug, Default)]
struct SchoolTables {
    schools: Vec<School>,
    departments: Vec<Department>,
    programs: Vec<Program>,
    reviews: Vec<Review>,
}

#[derive(Debug, Default, Clone)]
pub struct MemorySchools {
    tables: Arc<Mutex<SchoolTables>>,
}

impl SchoolRepository for MemorySchools {
    fn insert_school(&self, school: School) -> Result<School, RepositoryError> {
        let mut guard = lock(&self.tables, "school")?;
        if guard.schools.iter().any(|existing| existing.id == school.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.schools.push(school.clone());
        Ok(school)
    }

    fn fetch_school(&self, id: &SchoolId) -> Result<Option<School>, RepositoryError> {
        let guard = lock(&self.tables, "school")?;
        Ok(guard.schools.iter().find(|school| school.id == *id).cloned())
    }

    fn list_schools(&self) -> Result<Vec<School>, RepositoryError> {
        Ok(lock(&self.tables, "school")?.schools.clone())
    }

    fn insert_department(&self, department: Department) -> Result<Department, RepositoryError> {
        let mut guard = lock(&self.tables, "school")?;
        guard.departments.push(department.clone());
        Ok(department)
    }

    fn departments_for(&self, school: &SchoolId) -> Result<Vec<Department>, RepositoryError> {
        let guard = lock(&self.tables, "school")?;
        Ok(guard
            .departments
            .iter()
            .filter(|department| department.school == *school)
            .cloned()
            .collect())
    }

    fn insert_program(&self, program: Program) -> Result<Program, RepositoryError> {
        let mut guard = lock(&self.tables, "school")?;
        guard.programs.push(program.clone());
        Ok(program)
    }

    fn programs_for(&self, school: &SchoolId) -> Result<Vec<Program>, RepositoryError> {
        let guard = lock(&self.tables, "school")?;
        Ok(guard
            .programs
            .iter()
            .filter(|program| program.school == *school)
            .cloned()
            .collect())
    }

    fn insert_review(&self, review: Review) -> Result<Review, RepositoryError> {
        let mut guard = lock(&self.tables, "school")?;
        let duplicate = guard
            .reviews
            .iter()
            .any(|existing| existing.school == review.school && existing.author == review.author);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.reviews.push(review.clone());
        Ok(review)
    }

    fn reviews_for(&self, school: &SchoolId) -> Result<Vec<Review>, RepositoryError> {
        let guard = lock(&self.tables, "school")?;
        Ok(guard
            .reviews
            .iter()
            .filter(|review| review.school == *school)
            .cloned()
            .collect())
    }

    fn review_by(
        &self,
        school: &SchoolId,
        author: &UserId,
    ) -> Result<Option<Review>, RepositoryError> {
        let guard = lock(&self.tables, "school")?;
        Ok(guard
            .reviews
            .iter()
            .find(|review| review.school == *school && review.author == *author)
            .cloned())
    }
}

#[derive(Debug, Default)]
struct ResourceTables {
    resources: Vec<Resource>,
    comments: Vec<Comment>,
    collections: Vec<Collection>,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryResources {
    tables: Arc<Mutex<ResourceTables>>,
}

impl ResourceRepository for MemoryResources {
    fn insert(&self, resource: Resource) -> Result<Resource, RepositoryError> {
        let mut guard = lock(&self.tables, "resource")?;
        if guard.resources.iter().any(|existing| existing.id == resource.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.resources.push(resource.clone());
        Ok(resource)
    }

    fn fetch(&self, id: &ResourceId) -> Result<Option<Resource>, RepositoryError> {
        let guard = lock(&self.tables, "resource")?;
        Ok(guard.resources.iter().find(|resource| resource.id == *id).cloned())
    }

    fn list(&self) -> Result<Vec<Resource>, RepositoryError> {
        Ok(lock(&self.tables, "resource")?.resources.clone())
    }

    fn modify(
        &self,
        id: &ResourceId,
        change: &mut dyn FnMut(&mut Resource),
    ) -> Result<Resource, RepositoryError> {
        let mut guard = lock(&self.tables, "resource")?;
        let resource = guard
            .resources
            .iter_mut()
            .find(|resource| resource.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        change(resource);
        Ok(resource.clone())
    }

    fn insert_comment(&self, comment: Comment) -> Result<Comment, RepositoryError> {
        let mut guard = lock(&self.tables, "resource")?;
        guard.comments.push(comment.clone());
        Ok(comment)
    }

    fn comments_for(&self, resource: &ResourceId) -> Result<Vec<Comment>, RepositoryError> {
        let guard = lock(&self.tables, "resource")?;
        Ok(guard
            .comments
            .iter()
            .filter(|comment| comment.resource == *resource)
            .cloned()
            .collect())
    }

    fn insert_collection(&self, collection: Collection) -> Result<Collection, RepositoryError> {
        let mut guard = lock(&self.tables, "resource")?;
        guard.collections.push(collection.clone());
        Ok(collection)
    }

    fn update_collection(&self, collection: Collection) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.tables, "resource")?;
        replace(&mut guard.collections, collection, |a, b| a.id == b.id)
    }

    fn fetch_collection(&self, id: &CollectionId) -> Result<Option<Collection>, RepositoryError> {
        let guard = lock(&self.tables, "resource")?;
        Ok(guard
            .collections
            .iter()
            .find(|collection| collection.id == *id)
            .cloned())
    }

    fn collections_for(&self, owner: &UserId) -> Result<Vec<Collection>, RepositoryError> {
        let guard = lock(&self.tables, "resource")?;
        Ok(guard
            .collections
            .iter()
            .filter(|collection| collection.owner == *owner)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
struct ForumTables {
    categories: Vec<Category>,
    topics: Vec<Topic>,
    posts: Vec<Post>,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryForum {
    tables: Arc<Mutex<ForumTables>>,
}

impl ForumRepository for MemoryForum {
    fn insert_category(&self, category: Category) -> Result<Category, RepositoryError> {
        let mut guard = lock(&self.tables, "forum")?;
        let duplicate = guard
            .categories
            .iter()
            .any(|existing| existing.name.eq_ignore_ascii_case(&category.name));
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.categories.push(category.clone());
        Ok(category)
    }

    fn fetch_category(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError> {
        let guard = lock(&self.tables, "forum")?;
        Ok(guard.categories.iter().find(|category| category.id == *id).cloned())
    }

    fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(lock(&self.tables, "forum")?.categories.clone())
    }

    fn insert_topic(&self, topic: Topic, opening: Post) -> Result<Topic, RepositoryError> {
        let mut guard = lock(&self.tables, "forum")?;
        if !guard.categories.iter().any(|category| category.id == topic.category) {
            return Err(RepositoryError::NotFound);
        }
        guard.topics.push(topic.clone());
        guard.posts.push(opening);
        Ok(topic)
    }

    fn update_topic(&self, topic: Topic) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.tables, "forum")?;
        replace(&mut guard.topics, topic, |a, b| a.id == b.id)
    }

    fn fetch_topic(&self, id: &TopicId) -> Result<Option<Topic>, RepositoryError> {
        let guard = lock(&self.tables, "forum")?;
        Ok(guard.topics.iter().find(|topic| topic.id == *id).cloned())
    }

    fn topics_in(&self, category: &CategoryId) -> Result<Vec<Topic>, RepositoryError> {
        let guard = lock(&self.tables, "forum")?;
        Ok(guard
            .topics
            .iter()
            .filter(|topic| topic.category == *category)
            .cloned()
            .collect())
    }

    fn append_post(&self, post: Post) -> Result<Topic, RepositoryError> {
        let mut guard = lock(&self.tables, "forum")?;
        let topic = guard
            .topics
            .iter_mut()
            .find(|topic| topic.id == post.topic)
            .ok_or(RepositoryError::NotFound)?;
        if topic.locked {
            return Err(RepositoryError::Conflict);
        }
        if post.created_at > topic.last_activity_at {
            topic.last_activity_at = post.created_at;
        }
        let topic = topic.clone();
        guard.posts.push(post);
        Ok(topic)
    }

    fn posts_in(&self, topic: &TopicId) -> Result<Vec<Post>, RepositoryError> {
        let guard = lock(&self.tables, "forum")?;
        let mut posts: Vec<Post> = guard
            .posts
            .iter()
            .filter(|post| post.topic == *topic)
            .cloned()
            .collect();
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(posts)
    }
}

#[derive(Debug, Default)]
struct AppointmentTables {
    slots: Vec<AppointmentSlot>,
    exceptions: Vec<AppointmentException>,
    appointments: Vec<Appointment>,
    reminders: Vec<AppointmentReminder>,
}

impl AppointmentTables {
    /// Whether a non-terminal appointment of the same recipient overlaps `candidate`.
    fn collides(&self, candidate: &Appointment) -> bool {
        self.appointments.iter().any(|existing| {
            existing.id != candidate.id
                && existing.recipient == candidate.recipient
                && !existing.status.is_terminal()
                && existing.overlaps(candidate.schedule_time, candidate.end_time)
        })
    }

    fn expect_status(
        &self,
        id: &AppointmentId,
        expected: AppointmentStatus,
    ) -> Result<(), RepositoryError> {
        let stored = self
            .appointments
            .iter()
            .find(|appointment| appointment.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::Stale);
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryAppointments {
    tables: Arc<Mutex<AppointmentTables>>,
}

impl AppointmentRepository for MemoryAppointments {
    fn insert_slot(&self, slot: AppointmentSlot) -> Result<AppointmentSlot, RepositoryError> {
        let mut guard = lock(&self.tables, "appointment")?;
        guard.slots.push(slot.clone());
        Ok(slot)
    }

    fn update_slot(&self, slot: AppointmentSlot) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.tables, "appointment")?;
        replace(&mut guard.slots, slot, |a, b| a.id == b.id)
    }

    fn fetch_slot(&self, id: &SlotId) -> Result<Option<AppointmentSlot>, RepositoryError> {
        let guard = lock(&self.tables, "appointment")?;
        Ok(guard.slots.iter().find(|slot| slot.id == *id).cloned())
    }

    fn slots_for(&self, owner: &UserId) -> Result<Vec<AppointmentSlot>, RepositoryError> {
        let guard = lock(&self.tables, "appointment")?;
        Ok(guard
            .slots
            .iter()
            .filter(|slot| slot.owner == *owner)
            .cloned()
            .collect())
    }

    fn insert_exception(
        &self,
        exception: AppointmentException,
    ) -> Result<AppointmentException, RepositoryError> {
        let mut guard = lock(&self.tables, "appointment")?;
        guard.exceptions.push(exception.clone());
        Ok(exception)
    }

    fn exceptions_on(
        &self,
        owner: &UserId,
        date: NaiveDate,
    ) -> Result<Vec<AppointmentException>, RepositoryError> {
        let guard = lock(&self.tables, "appointment")?;
        Ok(guard
            .exceptions
            .iter()
            .filter(|exception| exception.owner == *owner && exception.date == date)
            .cloned()
            .collect())
    }

    fn insert_if_free(
        &self,
        appointment: Appointment,
        reminders: Vec<AppointmentReminder>,
    ) -> Result<Appointment, RepositoryError> {
        let mut guard = lock(&self.tables, "appointment")?;
        if guard.collides(&appointment) {
            return Err(RepositoryError::Conflict);
        }
        guard.appointments.push(appointment.clone());
        guard.reminders.extend(reminders);
        Ok(appointment)
    }

    fn update_if_free(
        &self,
        appointment: Appointment,
        expected: AppointmentStatus,
        reminders: Vec<AppointmentReminder>,
    ) -> Result<Appointment, RepositoryError> {
        let mut guard = lock(&self.tables, "appointment")?;
        guard.expect_status(&appointment.id, expected)?;
        if guard.collides(&appointment) {
            return Err(RepositoryError::Conflict);
        }
        let id = appointment.id;
        replace(&mut guard.appointments, appointment.clone(), |a, b| a.id == b.id)?;
        guard.reminders.retain(|reminder| reminder.appointment != id);
        guard.reminders.extend(reminders);
        Ok(appointment)
    }

    fn update_if_status(
        &self,
        appointment: Appointment,
        expected: AppointmentStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.tables, "appointment")?;
        let id = appointment.id;
        guard.expect_status(&id, expected)?;
        let terminal = appointment.status.is_terminal();
        replace(&mut guard.appointments, appointment, |a, b| a.id == b.id)?;
        if terminal {
            guard
                .reminders
                .retain(|reminder| reminder.appointment != id || reminder.sent);
        }
        Ok(())
    }

    fn fetch(&self, id: &AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        let guard = lock(&self.tables, "appointment")?;
        Ok(guard
            .appointments
            .iter()
            .find(|appointment| appointment.id == *id)
            .cloned())
    }

    fn appointments_for(&self, user: &UserId) -> Result<Vec<Appointment>, RepositoryError> {
        let guard = lock(&self.tables, "appointment")?;
        Ok(guard
            .appointments
            .iter()
            .filter(|appointment| appointment.involves(user))
            .cloned()
            .collect())
    }

    fn agenda(
        &self,
        recipient: &UserId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let guard = lock(&self.tables, "appointment")?;
        Ok(guard
            .appointments
            .iter()
            .filter(|appointment| {
                appointment.recipient == *recipient && appointment.overlaps(from, to)
            })
            .cloned()
            .collect())
    }

    fn all_appointments(&self) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(lock(&self.tables, "appointment")?.appointments.clone())
    }

    fn reminders_for(
        &self,
        appointment: &AppointmentId,
    ) -> Result<Vec<AppointmentReminder>, RepositoryError> {
        let guard = lock(&self.tables, "appointment")?;
        Ok(guard
            .reminders
            .iter()
            .filter(|reminder| reminder.appointment == *appointment)
            .cloned()
            .collect())
    }

    fn due_reminders(&self, now: NaiveDateTime) -> Result<Vec<AppointmentReminder>, RepositoryError> {
        let guard = lock(&self.tables, "appointment")?;
        let mut due: Vec<AppointmentReminder> = guard
            .reminders
            .iter()
            .filter(|reminder| !reminder.sent && reminder.remind_at <= now)
            .cloned()
            .collect();
        due.sort_by(|a, b| a.remind_at.cmp(&b.remind_at));
        Ok(due)
    }

    fn mark_reminder_sent(&self, id: &ReminderId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.tables, "appointment")?;
        let reminder = guard
            .reminders
            .iter_mut()
            .find(|reminder| reminder.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        reminder.sent = true;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct OrientationTables {
    assessments: Vec<Assessment>,
    attempts: Vec<Attempt>,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryOrientation {
    tables: Arc<Mutex<OrientationTables>>,
}

impl OrientationRepository for MemoryOrientation {
    fn insert_assessment(&self, assessment: Assessment) -> Result<Assessment, RepositoryError> {
        let mut guard = lock(&self.tables, "orientation")?;
        guard.assessments.push(assessment.clone());
        Ok(assessment)
    }

    fn update_assessment(&self, assessment: Assessment) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.tables, "orientation")?;
        replace(&mut guard.assessments, assessment, |a, b| a.id == b.id)
    }

    fn fetch_assessment(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        let guard = lock(&self.tables, "orientation")?;
        Ok(guard
            .assessments
            .iter()
            .find(|assessment| assessment.id == *id)
            .cloned())
    }

    fn list_assessments(&self) -> Result<Vec<Assessment>, RepositoryError> {
        Ok(lock(&self.tables, "orientation")?.assessments.clone())
    }

    fn insert_attempt(&self, attempt: Attempt) -> Result<Attempt, RepositoryError> {
        let mut guard = lock(&self.tables, "orientation")?;
        guard.attempts.push(attempt.clone());
        Ok(attempt)
    }

    fn attempts_for(&self, user: &UserId) -> Result<Vec<Attempt>, RepositoryError> {
        let guard = lock(&self.tables, "orientation")?;
        Ok(guard
            .attempts
            .iter()
            .filter(|attempt| attempt.user == *user)
            .cloned()
            .collect())
    }

    fn all_attempts(&self) -> Result<Vec<Attempt>, RepositoryError> {
        Ok(lock(&self.tables, "orientation")?.attempts.clone())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryScheduledReports {
    reports: Arc<Mutex<Vec<ScheduledReport>>>,
}

impl ScheduledReportRepository for MemoryScheduledReports {
    fn insert(&self, report: ScheduledReport) -> Result<ScheduledReport, RepositoryError> {
        let mut guard = lock(&self.reports, "scheduled report")?;
        guard.push(report.clone());
        Ok(report)
    }

    fn update(&self, report: ScheduledReport) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.reports, "scheduled report")?;
        replace(&mut guard, report, |a, b| a.id == b.id)
    }

    fn fetch(&self, id: &ScheduledReportId) -> Result<Option<ScheduledReport>, RepositoryError> {
        let guard = lock(&self.reports, "scheduled report")?;
        Ok(guard.iter().find(|report| report.id == *id).cloned())
    }

    fn list(&self) -> Result<Vec<ScheduledReport>, RepositoryError> {
        Ok(lock(&self.reports, "scheduled report")?.clone())
    }

    fn owned_by(&self, owner: &UserId) -> Result<Vec<ScheduledReport>, RepositoryError> {
        let guard = lock(&self.reports, "scheduled report")?;
        Ok(guard
            .iter()
            .filter(|report| report.owner == *owner)
            .cloned()
            .collect())
    }
}
