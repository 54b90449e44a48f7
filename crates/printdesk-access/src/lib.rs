//! # printdesk-access
//!
//! One capability table, consulted once at the request boundary.
//!
//! Callers turn an authenticated [`Principal`] into a [`Grant`] with
//! [`authorize`]; core operations take `&Grant` and only check that it
//! carries the capability they need.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Superuser,
    Designer,
    SalesRepresentative,
    Operator,
    Clerk,
}

impl Role {
    pub const ALL: &'static [Role] = &[
        Role::Superuser,
        Role::Designer,
        Role::SalesRepresentative,
        Role::Operator,
        Role::Clerk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superuser => "SUPERUSER",
            Role::Designer => "DESIGNER",
            Role::SalesRepresentative => "SALES_REPRESENTATIVE",
            Role::Operator => "OPERATOR",
            Role::Clerk => "CLERK",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AccessError::UnknownRole(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    CreateJob,
    ViewJobs,
    EditJob,
    UpdateJobStatus,
    UpdatePayment,
    ViewDocketCounter,
    BrowseCatalog,
    CreateCustomSize,
    ManageCatalog,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CreateJob => "CREATE_JOB",
            Capability::ViewJobs => "VIEW_JOBS",
            Capability::EditJob => "EDIT_JOB",
            Capability::UpdateJobStatus => "UPDATE_JOB_STATUS",
            Capability::UpdatePayment => "UPDATE_PAYMENT",
            Capability::ViewDocketCounter => "VIEW_DOCKET_COUNTER",
            Capability::BrowseCatalog => "BROWSE_CATALOG",
            Capability::CreateCustomSize => "CREATE_CUSTOM_SIZE",
            Capability::ManageCatalog => "MANAGE_CATALOG",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const SUPERUSER: &[Capability] = &[
    Capability::CreateJob,
    Capability::ViewJobs,
    Capability::EditJob,
    Capability::UpdateJobStatus,
    Capability::UpdatePayment,
    Capability::ViewDocketCounter,
    Capability::BrowseCatalog,
    Capability::CreateCustomSize,
    Capability::ManageCatalog,
];

const DESIGNER: &[Capability] = &[
    Capability::CreateJob,
    Capability::ViewJobs,
    Capability::EditJob,
    Capability::UpdateJobStatus,
    Capability::ViewDocketCounter,
    Capability::BrowseCatalog,
    Capability::CreateCustomSize,
];

const SALES_REPRESENTATIVE: &[Capability] = &[
    Capability::CreateJob,
    Capability::ViewJobs,
    Capability::EditJob,
    Capability::ViewDocketCounter,
    Capability::BrowseCatalog,
    Capability::CreateCustomSize,
];

const OPERATOR: &[Capability] = &[
    Capability::ViewJobs,
    Capability::UpdateJobStatus,
    Capability::ViewDocketCounter,
    Capability::BrowseCatalog,
    Capability::CreateCustomSize,
];

const CLERK: &[Capability] = &[
    Capability::ViewJobs,
    Capability::UpdatePayment,
    Capability::ViewDocketCounter,
    Capability::BrowseCatalog,
    Capability::CreateCustomSize,
];

/// The capability table.
pub fn capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Superuser => SUPERUSER,
        Role::Designer => DESIGNER,
        Role::SalesRepresentative => SALES_REPRESENTATIVE,
        Role::Operator => OPERATOR,
        Role::Clerk => CLERK,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("{0} has no role assigned yet")]
    NoRole(String),

    #[error("{0} is awaiting approval")]
    NotApproved(String),

    #[error("{role} may not {capability}")]
    Forbidden { role: Role, capability: Capability },

    #[error("{name} may only change their own {resource}")]
    NotOwner { name: String, resource: String },
}

/// An authenticated user as seen by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub role: Option<Role>,
    pub approved: bool,
}

impl Principal {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role: Some(role),
            approved: true,
        }
    }

    /// A registered user who has not been assigned a role yet.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
            approved: false,
        }
    }
}

/// Proof that a principal's role holds one capability.
///
/// Only [`authorize`] constructs grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    capability: Capability,
    role: Role,
    name: String,
}

impl Grant {
    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Name of the principal the grant was issued to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// SUPERUSER passes for any owner; everyone else must be `owner`.
    pub fn require_owner(&self, owner: &str, resource: &str) -> Result<(), AccessError> {
        if self.role == Role::Superuser || self.name == owner.trim() {
            Ok(())
        } else {
            Err(AccessError::NotOwner {
                name: self.name.clone(),
                resource: resource.to_string(),
            })
        }
    }

    pub fn require(&self, capability: Capability) -> Result<(), AccessError> {
        if self.capability == capability {
            Ok(())
        } else {
            Err(AccessError::Forbidden {
                role: self.role,
                capability,
            })
        }
    }
}

pub fn authorize(principal: &Principal, capability: Capability) -> Result<Grant, AccessError> {
    let role = principal
        .role
        .ok_or_else(|| AccessError::NoRole(principal.name.clone()))?;
    if !principal.approved {
        return Err(AccessError::NotApproved(principal.name.clone()));
    }
    if !capabilities(role).contains(&capability) {
        return Err(AccessError::Forbidden { role, capability });
    }
    Ok(Grant {
        capability,
        role,
        name: principal.name.clone(),
    })
}
