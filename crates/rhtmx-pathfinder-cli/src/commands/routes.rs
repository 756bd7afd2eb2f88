use colored::Colorize;
use rhtmx_pathfinder::{HandlerRef, Router};

pub fn execute(router: &Router<HandlerRef>) {
    if router.is_empty() {
        println!("{}", "No routes registered".yellow());
        return;
    }

    println!("{}", format!("{} route(s)", router.len()).green().bold());
    println!();

    for route in router.routes() {
        let abstraction = route.definition.abstraction();
        println!(
            "  {}  {}  {}",
            route.compiled.pattern().cyan(),
            route.name().bold(),
            abstraction.handler
        );
        if let Some(role) = &abstraction.role {
            println!("      role: {}", role);
        }
        println!("      regex: {}", route.compiled.regex_source().dimmed());
    }

    let fields = router.field_names();
    if !fields.is_empty() {
        println!();
        println!("Fields: {}", fields.join(", "));
    }
}
