pub mod access;
pub mod health;
pub mod permissions;
pub mod policies;
pub mod resources;
pub mod roles;
pub mod user_roles;
