pub mod build;
pub mod dispatch;
pub mod routes;

/// Parses a `key=value` argument
pub fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got {:?}", arg)),
    }
}

/// Route table shared by the command tests
#[cfg(test)]
pub(crate) fn test_router() -> rhtmx_pathfinder::Router<rhtmx_pathfinder::HandlerRef> {
    const TABLE: &str = r#"
        [[tags]]
        name = "year"
        regex = "[0-9]{4}"

        [[fields]]
        name = "role"

        [[routes]]
        pattern = "/users/{id: [0-9]+}"
        handler = "users.show"
        name = "user.show"
        before = [{ handler = "auth", priority = 10 }]

        [[routes]]
        pattern = "/admin"
        handler = "admin.index"
        role = "admin"

        [[mounts]]
        prefix = "/blog"
        routes = [{ pattern = "/{year: [!:year:!]}/{slug}", handler = "posts.show", name = "post.show" }]
    "#;

    rhtmx_pathfinder::RouteTableConfig::from_toml_str(TABLE)
        .unwrap()
        .build_router()
        .unwrap()
}
