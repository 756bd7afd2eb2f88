use anyhow::Result;
use colored::Colorize;
use rhtmx_pathfinder::{HandlerRef, ResolvedRoute, Router};
use serde::Serialize;
use std::io::Write;
use tracing::debug;

/// JSON shape of a successful match
#[derive(Debug, Serialize)]
struct MatchReport<'a> {
    path: &'a str,
    route: &'a str,
    handler: &'a HandlerRef,
    params: &'a [(String, String)],
}

pub fn execute(
    out: &mut impl Write,
    router: &Router<HandlerRef>,
    path: &str,
    fields: Vec<(String, String)>,
    json: bool,
) -> Result<()> {
    debug!(path, fields = fields.len(), "matching path");
    let resolved = router.dispatch(path, fields)?;

    match resolved {
        Some(resolved) if json => write_json(out, path, &resolved)?,
        Some(resolved) => write_match(out, &resolved)?,
        None if json => writeln!(out, "null")?,
        None => writeln!(out, "{} {}", "No route matches".yellow(), path)?,
    }

    Ok(())
}

fn write_json(out: &mut impl Write, path: &str, resolved: &ResolvedRoute<'_, HandlerRef>) -> Result<()> {
    let report = MatchReport {
        path,
        route: resolved.name(),
        handler: resolved.abstraction(),
        params: resolved.params(),
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

fn write_match(out: &mut impl Write, resolved: &ResolvedRoute<'_, HandlerRef>) -> Result<()> {
    writeln!(
        out,
        "{} {} → {}",
        "✓".green().bold(),
        resolved.name().bold(),
        resolved.abstraction().handler.cyan()
    )?;
    for (name, value) in resolved.params() {
        writeln!(out, "    {} = {}", name, value)?;
    }
    for hook in resolved.before() {
        writeln!(out, "    before: {} ({})", hook.abstraction.handler, hook.priority)?;
    }
    for hook in resolved.after() {
        writeln!(out, "    after: {} ({})", hook.abstraction.handler, hook.priority)?;
    }
    Ok(())
}
