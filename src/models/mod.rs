//! # Data Models
//!
//! SeaORM entities for every table of the timetable store.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod activity_log;
pub mod group;
pub mod group_subject;
pub mod room;
pub mod schedule_entry;
pub mod scheduling_constraint;
pub mod subject;
pub mod teacher;
pub mod teacher_subject;
pub mod user;

pub use activity_log::Entity as ActivityLog;
pub use group::Entity as Group;
pub use group_subject::Entity as GroupSubject;
pub use room::Entity as Room;
pub use schedule_entry::Entity as ScheduleEntry;
pub use scheduling_constraint::{Entity as SchedulingConstraint, TargetKind};
pub use subject::Entity as Subject;
pub use teacher::Entity as Teacher;
pub use teacher_subject::Entity as TeacherSubject;
pub use user::{Entity as User, Role};

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "timetable".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
