//! ecslink-ecs: template/system relationship resolver.
//!
//! Decodes the engine's `getECSData` payload and works out which systems
//! run on which entity templates, and which template component feeds which
//! system argument.
pub mod error;
pub mod graph;
pub mod model;
pub mod resolve;

pub use error::EcsError;
pub use graph::{Link, ResolvedGraph, System, Template, TemplateComponent};
pub use model::{ComponentDesc, EcsData, ScriptSystemData, SystemData, TemplateData};
pub use resolve::{component_index, has_component, resolve};
