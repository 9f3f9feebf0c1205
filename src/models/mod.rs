pub mod job;
pub mod user;

pub use job::{Job, JobEnvelope, JobPatch, JobStatus};
pub use user::{
    Ack, Identity, LoginRequest, LoginResponse, PasswordChange, Registration, UserEnvelope,
};
