//! Shared domain types for TrackForge.
//!
//! Records serialize with camelCase field names so documents written by the
//! local gateway stay readable by any other TrackForge front end.

pub mod models;

pub use models::{
    Client, ClientDraft, ClientPatch, Density, Priority, Project, ProjectDraft, ProjectPatch,
    Settings, Stage, Task, TaskDraft, TaskPatch, format_timestamp, new_id, now_timestamp,
    parse_timestamp,
};
