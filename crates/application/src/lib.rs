//! Application services and ports.

#![forbid(unsafe_code)]

mod access_admin_ports;
mod access_admin_service;
mod access_service;
mod bootstrap_service;

pub use access_admin_ports::{
    AccessAdminRepository, AssignRoleInput, CreatePermissionInput, CreatePolicyInput,
    CreateResourceInput, CreateRoleInput, UpdatePolicyInput, UpdateResourceInput, UpdateRoleInput,
};
pub use access_admin_service::AccessAdminService;
pub use access_service::{AccessGraphRepository, AccessService};
pub use bootstrap_service::{BootstrapRepository, BootstrapService, ReconcileReport, SeedReport};
