//! The tool surface: descriptors, handlers and text renderers per Graph area.

mod calendar;
mod directory;
mod mail;
mod presence;
mod profile;
mod render;
mod teams;

use crate::registry::ToolRegistry;

/// Build the process-wide registry. Called once at startup.
pub fn build_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    profile::register(&mut registry);
    mail::register(&mut registry);
    calendar::register(&mut registry);
    directory::register(&mut registry);
    presence::register(&mut registry);
    teams::register(&mut registry);
    registry
}
