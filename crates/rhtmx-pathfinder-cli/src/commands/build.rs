use anyhow::{Context, Result};
use rhtmx_pathfinder::{HandlerRef, Router};
use std::collections::HashMap;
use std::io::Write;
use tracing::debug;

pub fn execute(
    out: &mut impl Write,
    router: &Router<HandlerRef>,
    name: &str,
    vars: &[(String, String)],
) -> Result<()> {
    debug!(route = name, vars = vars.len(), "building path");
    let vars: HashMap<String, String> = vars.iter().cloned().collect();
    let path = router
        .build_path(name, &vars)
        .with_context(|| format!("Failed to build a path for route {:?}", name))?;

    writeln!(out, "{}", path)?;
    Ok(())
}
