//! Resolved template/system relationships.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::ComponentDesc;

/// A template component with its remap table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateComponent {
    pub name: String,
    pub type_name: String,
    /// System index -> position of this component in that system's
    /// requirement list. `None` means the system applies but does not take
    /// this component. Systems that do not apply have no entry.
    pub remap: BTreeMap<usize, Option<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub name: String,
    pub components: Vec<TemplateComponent>,
    /// Indices of applicable systems, ascending.
    pub systems: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct System {
    /// Name with the `exec_` prefix stripped.
    pub name: String,
    /// Combined requirements: arguments (minus `eid`), must-have,
    /// must-be-true, must-be-false.
    pub components: Vec<ComponentDesc>,
    /// Components that must be absent.
    pub not_have: Vec<ComponentDesc>,
    /// Declared as a query rather than an `exec_` function.
    pub is_query: bool,
    /// Declared in script rather than natively.
    pub is_script: bool,
}

/// One edge drawn between a template component and a system component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub template: usize,
    pub component: usize,
    pub system: usize,
    pub system_component: usize,
}

/// Output of [`resolve`](crate::resolve::resolve).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedGraph {
    pub templates: Vec<Template>,
    pub systems: Vec<System>,
}

impl ResolvedGraph {
    /// Systems applicable to the template at `template`.
    pub fn systems_for(&self, template: usize) -> impl Iterator<Item = (usize, &System)> + '_ {
        self.templates
            .get(template)
            .map(|t| t.systems.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&i| self.systems.get(i).map(|s| (i, s)))
    }

    /// Templates the system at `system` applies to.
    pub fn templates_for(&self, system: usize) -> impl Iterator<Item = (usize, &Template)> + '_ {
        self.templates
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.systems.contains(&system))
    }

    /// Every resolved remap entry, in template then component then system
    /// order.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.templates.iter().enumerate().flat_map(|(ti, t)| {
            t.components.iter().enumerate().flat_map(move |(ci, c)| {
                c.remap.iter().filter_map(move |(&si, &pos)| {
                    pos.map(|system_component| Link {
                        template: ti,
                        component: ci,
                        system: si,
                        system_component,
                    })
                })
            })
        })
    }

    /// Whether any template component links into `system`.
    pub fn is_visible(&self, system: usize) -> bool {
        self.links().any(|link| link.system == system)
    }

    /// Indices of systems with at least one link.
    pub fn visible_systems(&self) -> Vec<usize> {
        (0..self.systems.len())
            .filter(|&i| self.is_visible(i))
            .collect()
    }
}
