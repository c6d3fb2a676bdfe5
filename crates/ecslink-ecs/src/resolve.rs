//! Template/system relationship resolution.
//!
//! A system applies to a template when the template satisfies every entry of
//! the system's combined requirement list and carries none of its
//! must-not-have components. For each applicable pair, every template
//! component records where it sits in the system's requirement list.

use std::collections::BTreeMap;

use crate::graph::{ResolvedGraph, System, Template, TemplateComponent};
use crate::model::{ComponentDesc, EcsData, ScriptSystemData, SystemData};

/// Pseudo-component every entity carries.
pub const ENTITY_ID: &str = "eid";

/// Prefix of native system functions.
pub const EXEC_PREFIX: &str = "exec_";

/// Type-name substrings that always bind to the first argument.
const POSITION_ZERO_MARKERS: [&str; 2] = ["Stage", "Event"];

/// Position of `wanted` within `components`.
///
/// `eid` is looked up by name. Stage and event types bind to position 0
/// regardless of what `components` holds.
pub fn component_index(components: &[ComponentDesc], wanted: &ComponentDesc) -> Option<usize> {
    if wanted.name == ENTITY_ID {
        return components.iter().position(|c| c.name == ENTITY_ID);
    }
    if POSITION_ZERO_MARKERS
        .iter()
        .any(|marker| wanted.type_name.contains(marker))
    {
        return Some(0);
    }
    components.iter().position(|c| c.name == wanted.name)
}

/// Whether `components` satisfies the requirement `wanted`.
pub fn has_component(components: &[ComponentDesc], wanted: &ComponentDesc) -> bool {
    wanted.name == ENTITY_ID || component_index(components, wanted).is_some()
}

fn strip_exec(name: &str) -> (String, bool) {
    match name.strip_prefix(EXEC_PREFIX) {
        Some(rest) => (rest.to_string(), false),
        None => (name.to_string(), true),
    }
}

fn native_system(raw: &SystemData) -> System {
    let (name, is_query) = strip_exec(&raw.name);
    let components = raw
        .components
        .iter()
        .filter(|c| c.name != ENTITY_ID)
        .chain(&raw.have_components)
        .chain(&raw.is_true_components)
        .chain(&raw.is_false_components)
        .cloned()
        .collect();
    System {
        name,
        components,
        not_have: raw.not_have_components.clone(),
        is_query,
        is_script: false,
    }
}

fn script_system(raw: &ScriptSystemData) -> System {
    let (name, is_query) = strip_exec(&raw.name);
    System {
        name,
        components: raw
            .components
            .iter()
            .filter(|c| c.name != ENTITY_ID)
            .cloned()
            .collect(),
        not_have: Vec::new(),
        is_query,
        is_script: true,
    }
}

fn applies(system: &System, template: &[ComponentDesc]) -> bool {
    system.components.iter().all(|c| has_component(template, c))
        && !system.not_have.iter().any(|c| has_component(template, c))
}

/// Compute the relationship graph for `data`.
///
/// Pure: the input is not modified and equal inputs give equal outputs.
/// Native systems come first, then script systems, each in payload order.
pub fn resolve(data: &EcsData) -> ResolvedGraph {
    let systems: Vec<System> = data
        .systems
        .iter()
        .map(native_system)
        .chain(data.script_systems.iter().map(script_system))
        .collect();

    let templates = data
        .templates
        .iter()
        .map(|raw| {
            let mut components: Vec<TemplateComponent> = raw
                .components
                .iter()
                .map(|c| TemplateComponent {
                    name: c.name.clone(),
                    type_name: c.type_name.clone(),
                    remap: BTreeMap::new(),
                })
                .collect();
            let mut applicable = Vec::new();

            for (si, system) in systems.iter().enumerate() {
                if !applies(system, &raw.components) {
                    continue;
                }
                applicable.push(si);
                for (component, desc) in components.iter_mut().zip(&raw.components) {
                    component
                        .remap
                        .insert(si, component_index(&system.components, desc));
                }
            }

            tracing::trace!(template = %raw.name, systems = ?applicable, "template resolved");
            Template {
                name: raw.name.clone(),
                components,
                systems: applicable,
            }
        })
        .collect();

    ResolvedGraph { templates, systems }
}
