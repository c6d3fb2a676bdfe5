use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use ecslink_bridge::commands::GET_ECS_DATA;
use ecslink_ecs::{resolve, EcsData, ResolvedGraph};

use super::{print_json, App};

pub(super) async fn run(app: &App, file: Option<&Path>, summary: bool) -> Result<()> {
    let data = match file {
        Some(path) => read_payload(path)?,
        None => fetch_payload(app).await?,
    };
    tracing::debug!(
        templates = data.templates.len(),
        systems = data.systems.len(),
        script_systems = data.script_systems.len(),
        "ECS payload loaded"
    );

    let graph = resolve(&data);
    if summary {
        print!("{}", render_summary(&graph));
        Ok(())
    } else {
        print_json(&graph)
    }
}

fn read_payload(path: &Path) -> Result<EcsData> {
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let data = if path.extension().is_some_and(|e| e == "bson") {
        EcsData::from_bson(&bytes)
    } else {
        EcsData::from_json(&String::from_utf8_lossy(&bytes))
    };
    data.with_context(|| format!("cannot decode {}", path.display()))
}

async fn fetch_payload(app: &App) -> Result<EcsData> {
    let bridge = app.bridge();
    let reply = bridge.send_command(GET_ECS_DATA, json!({})).await;
    bridge.close().await;
    let reply = reply.context("cannot fetch ECS data")?;

    // The engine nests the payload under the command name.
    let payload = reply.get(GET_ECS_DATA).cloned().unwrap_or(reply.body);
    EcsData::from_value(payload).context("engine sent an invalid ECS payload")
}

fn render_summary(graph: &ResolvedGraph) -> String {
    let mut out = String::new();
    for (ti, template) in graph.templates.iter().enumerate() {
        let names: Vec<&str> = graph.systems_for(ti).map(|(_, s)| s.name.as_str()).collect();
        let _ = writeln!(out, "{}: {}", template.name, names.join(", "));
    }
    let hidden: Vec<&str> = graph
        .systems
        .iter()
        .enumerate()
        .filter(|(si, _)| !graph.is_visible(*si))
        .map(|(_, s)| s.name.as_str())
        .collect();
    if !hidden.is_empty() {
        let _ = writeln!(out, "unlinked: {}", hidden.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "templates": [
            {"name": "Ball", "components": [{"type": "Vec3", "name": "pos"}, {"type": "Vec3", "name": "vel"}]},
            {"name": "Wall", "components": [{"type": "Vec3", "name": "pos"}]}
        ],
        "systems": [
            {"name": "exec_move", "components": [{"type": "Vec3", "name": "pos"}, {"type": "Vec3", "name": "vel"}]},
            {"name": "exec_tick", "components": []}
        ]
    }"#;

    #[test]
    fn summary_lists_systems_per_template() {
        let graph = resolve(&EcsData::from_json(PAYLOAD).unwrap());
        assert_eq!(
            render_summary(&graph),
            "Ball: move, tick\nWall: tick\nunlinked: tick\n"
        );
    }

    #[test]
    fn read_payload_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("ecs.json");
        std::fs::write(&json_path, PAYLOAD).unwrap();
        assert_eq!(read_payload(&json_path).unwrap().templates.len(), 2);

        let doc = bson::doc! { "templates": [ { "name": "Ball", "components": [] } ] };
        let mut bytes = Vec::new();
        doc.to_writer(&mut bytes).unwrap();
        let bson_path = dir.path().join("ecs.bson");
        std::fs::write(&bson_path, bytes).unwrap();
        assert_eq!(read_payload(&bson_path).unwrap().templates[0].name, "Ball");
    }

    #[test]
    fn read_payload_reports_path() {
        let err = read_payload(Path::new("/nonexistent/ecs.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/ecs.json"));
    }
}
