pub mod task;
pub mod user;

pub use task::{StatusChange, Task, TaskInput, TaskStatus};
pub use user::{Account, AccountUpdate, PasswordChange, Role, RoleChange};
