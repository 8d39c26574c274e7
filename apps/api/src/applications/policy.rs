//! Access policy for the application lifecycle.
//!
//! A pure decision function: no storage, no transport. The engine consults
//! it for every operation. The role gate is always evaluated before the
//! ownership check, so a non-employer touching someone else's job's
//! applications gets `RoleForbidden`, never `AccessDenied`.

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Role, UserRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SubmitApplication,
    ViewApplication,
    ListJobApplications,
    UpdateApplicationStatus,
}

/// The authenticated identity, reduced to what authorization needs.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl From<&UserRecord> for Actor {
    fn from(user: &UserRecord) -> Self {
        Actor {
            id: user.id,
            role: user.role,
        }
    }
}

/// Ownership facts about the record(s) an operation touches.
#[derive(Debug, Clone, Copy)]
pub enum Resource {
    None,
    Job {
        employer_id: Uuid,
    },
    Application {
        applicant_id: Uuid,
        job_employer_id: Uuid,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    RoleForbidden(&'static str),
    NotOwner(&'static str),
}

impl Decision {
    pub fn require(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(Denial::RoleForbidden(msg)) => Err(AppError::RoleForbidden(msg.into())),
            Decision::Deny(Denial::NotOwner(msg)) => Err(AppError::AccessDenied(msg.into())),
        }
    }
}

/// Role gate only. The engine calls this before loading the resource, so a
/// wrong-role actor is refused without revealing whether the record exists.
pub fn check_role(actor: &Actor, operation: Operation) -> Decision {
    let denial = match operation {
        Operation::SubmitApplication if actor.role != Role::Jobseeker => {
            Some("Only job seekers can apply for jobs")
        }
        Operation::ListJobApplications if actor.role != Role::Employer => {
            Some("Only employers can view job applications")
        }
        Operation::UpdateApplicationStatus if actor.role != Role::Employer => {
            Some("Only employers can update application status")
        }
        // Viewing a single application is open to both roles; ownership decides.
        _ => None,
    };
    match denial {
        Some(msg) => Decision::Deny(Denial::RoleForbidden(msg)),
        None => Decision::Allow,
    }
}

/// Full check: role first, then ownership against the resource.
pub fn authorize(actor: &Actor, operation: Operation, resource: &Resource) -> Decision {
    if let Decision::Deny(denial) = check_role(actor, operation) {
        return Decision::Deny(denial);
    }

    match (operation, resource) {
        (Operation::SubmitApplication, _) => Decision::Allow,
        (
            Operation::ViewApplication,
            Resource::Application {
                applicant_id,
                job_employer_id,
            },
        ) => {
            if actor.id == *applicant_id || actor.id == *job_employer_id {
                Decision::Allow
            } else {
                Decision::Deny(Denial::NotOwner("Access denied"))
            }
        }
        (Operation::ListJobApplications, Resource::Job { employer_id }) => {
            if actor.id == *employer_id {
                Decision::Allow
            } else {
                Decision::Deny(Denial::NotOwner(
                    "You can only view applications for your own jobs",
                ))
            }
        }
        (
            Operation::UpdateApplicationStatus,
            Resource::Application {
                job_employer_id, ..
            },
        ) => {
            if actor.id == *job_employer_id {
                Decision::Allow
            } else {
                Decision::Deny(Denial::NotOwner(
                    "You can only update applications for your own jobs",
                ))
            }
        }
        // An ownership-gated operation consulted without its resource is
        // never allowed.
        _ => Decision::Deny(Denial::NotOwner("Access denied")),
    }
}
