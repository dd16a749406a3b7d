pub mod project;
pub mod reset_token;
pub mod task;
pub mod user;

pub use project::{
    NewProject, PriorityUpdate, PriorityUpdateList, Project, ProjectRequest, ProjectView,
};
pub use reset_token::{NewPasswordRequest, PasswordResetRequest, PasswordResetToken};
pub use task::{NewTask, Task, TaskRequest};
pub use user::{NewUser, Role, User, DEFAULT_PERSONALITY};
