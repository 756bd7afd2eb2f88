//! Integration tests for rhtmx-pathfinder
//!
//! Tests are organized by feature area and cover:
//! - Placeholder extraction and regex constraints
//! - Tags
//! - Registration conflicts and route names
//! - Field validators
//! - Reverse path building
//! - Collections and hooks

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rhtmx_pathfinder::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Page {
    handler: &'static str,
    role: Option<&'static str>,
}

impl Page {
    fn public(handler: &'static str) -> Self {
        Self { handler, role: None }
    }

    fn guarded(handler: &'static str, role: &'static str) -> Self {
        Self {
            handler,
            role: Some(role),
        }
    }
}

impl RouteProperties for Page {
    const PROPERTIES: &'static [&'static str] = &["role"];

    fn property(&self, name: &str) -> Option<String> {
        match name {
            "role" => self.role.map(str::to_string),
            _ => None,
        }
    }
}

fn role_field() -> FieldValidator {
    FieldValidator::new("role", |value, props| {
        props.get("role").map_or(true, |required| required == value)
    })
}

// ============================================================================
// Placeholders
// ============================================================================

#[test]
fn test_constrained_placeholder() {
    let mut builder = RouterBuilder::new();
    builder.register("/users/{id: [0-9]+}", Page::public("users.show")).unwrap();
    let router = builder.build().unwrap();

    let resolved = router.dispatch("/users/42", ()).unwrap().unwrap();
    assert_eq!(resolved.abstraction().handler, "users.show");
    assert_eq!(resolved.params(), &[("id".to_string(), "42".to_string())]);

    assert!(router.dispatch("/users/abc", ()).unwrap().is_none());
    assert!(router.dispatch("/users/42/extra", ()).unwrap().is_none());
}

#[test]
fn test_default_fragment_stops_at_separator() {
    let mut builder = RouterBuilder::new();
    builder.register("/files/{name}", ()).unwrap();
    let router = builder.build().unwrap();

    assert_eq!(
        router.dispatch("/files/a.txt", ()).unwrap().unwrap().param("name"),
        Some("a.txt")
    );
    assert!(router.dispatch("/files/a/b", ()).unwrap().is_none());
}

#[test]
fn test_nested_braces_in_fragment() {
    let mut builder = RouterBuilder::new();
    builder.register("/d/{date: [0-9]{4}-[0-9]{2}}", ()).unwrap();
    let router = builder.build().unwrap();

    assert!(router.dispatch("/d/2024-01", ()).unwrap().is_some());
    assert!(router.dispatch("/d/24-01", ()).unwrap().is_none());
}

#[test]
fn test_fragment_with_groups_keeps_values_aligned() {
    let mut builder = RouterBuilder::new();
    builder
        .register("/{lang: (en|fr)}/{page}", ())
        .unwrap()
        .set_name("page");
    let router = builder.build().unwrap();

    let resolved = router.dispatch("/fr/about", ()).unwrap().unwrap();
    assert_eq!(resolved.param("lang"), Some("fr"));
    assert_eq!(resolved.param("page"), Some("about"));
}

#[test]
fn test_duplicate_placeholder_is_rejected() {
    let mut builder: RouterBuilder<()> = RouterBuilder::new();
    let err = builder.register("/{id}/{id}", ()).unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::DuplicatePlaceholder { name, .. }) if name == "id"
    ));
}

#[test]
fn test_invalid_regex_is_rejected() {
    let mut builder: RouterBuilder<()> = RouterBuilder::new();
    let err = builder.register("/{id: [0-9}", ()).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_literal_text_is_escaped() {
    let mut builder = RouterBuilder::new();
    builder.register("/feed.xml", ()).unwrap();
    let router = builder.build().unwrap();

    assert!(router.dispatch("/feed.xml", ()).unwrap().is_some());
    assert!(router.dispatch("/feedxxml", ()).unwrap().is_none());
}

// ============================================================================
// Tags
// ============================================================================

#[test]
fn test_tag_in_literal_position() {
    let mut builder = RouterBuilder::new();
    builder.add_tag("year", "[0-9]{4}").unwrap();
    builder.register("/archive/[!:year:!]/{slug}", ()).unwrap().set_name("archive");
    let router = builder.build().unwrap();

    let resolved = router.dispatch("/archive/2024/hello", ()).unwrap().unwrap();
    assert_eq!(resolved.param("slug"), Some("hello"));
    assert!(router.dispatch("/archive/24/hello", ()).unwrap().is_none());

    let err = router
        .build_path_params("archive", &[("slug", "hello")])
        .unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::NotReversible { tag, .. }) if tag == "year"
    ));
}

#[test]
fn test_tag_inside_placeholder() {
    let mut builder = RouterBuilder::new();
    builder.add_tag("slug", "[a-z0-9-]+").unwrap();
    builder.register("/posts/{slug: [!:Slug:!]}", ()).unwrap().set_name("post");
    let router = builder.build().unwrap();

    assert!(router.dispatch("/posts/hello-world", ()).unwrap().is_some());
    assert!(router.dispatch("/posts/Hello", ()).unwrap().is_none());
    assert_eq!(
        router.build_path_params("post", &[("slug", "hello-world")]).unwrap(),
        "/posts/hello-world"
    );
}

#[test]
fn test_unknown_tag_and_invalid_tag_name() {
    let mut builder: RouterBuilder<()> = RouterBuilder::new();
    let err = builder.register("/x/[!:nope:!]", ()).unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::UnknownTagReference(name)) if name == "nope"
    ));

    let err = builder.add_tag("bad tag", "x").unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::InvalidTagName(_))
    ));
}

#[test]
fn test_tag_fragment_references_later_tag() {
    let mut builder = RouterBuilder::new();
    builder.add_tag("slug", "[a-z]+-[!:num:!]").unwrap();
    builder.add_tag("num", "[0-9]+").unwrap();
    builder
        .register("/articles/{slug: [!:slug:!]}", Page::public("articles.show"))
        .unwrap()
        .set_name("article");
    let router = builder.build().unwrap();

    let resolved = router.dispatch("/articles/intro-42", ()).unwrap().unwrap();
    assert_eq!(resolved.param("slug"), Some("intro-42"));
    assert!(router.dispatch("/articles/intro", ()).unwrap().is_none());
    assert_eq!(
        router.build_path_params("article", &[("slug", "outro-7")]).unwrap(),
        "/articles/outro-7"
    );
}

#[test]
fn test_tag_must_exist_before_registration() {
    let mut builder: RouterBuilder<()> = RouterBuilder::new();
    assert!(builder.register("/y/[!:year:!]", ()).is_err());

    builder.add_tag("year", "[0-9]{4}").unwrap();
    assert!(builder.register("/y/[!:year:!]", ()).is_ok());
}

// ============================================================================
// Registration, names and ordering
// ============================================================================

#[test]
fn test_first_match_wins() {
    let mut builder = RouterBuilder::new();
    builder.register("/users/{name}", Page::public("by-name")).unwrap();
    builder.register("/users/{id: [0-9]+}", Page::public("by-id")).unwrap();
    let router = builder.build().unwrap();

    let candidates = router.query("/users/7", ()).unwrap();
    assert_eq!(candidates.len(), 2);

    let resolved = router.dispatch("/users/7", ()).unwrap().unwrap();
    assert_eq!(resolved.abstraction().handler, "by-name");
    assert_eq!(Some(resolved.handle()), candidates.first());
}

#[test]
fn test_handle_conflict_but_names_may_repeat() {
    let mut builder = RouterBuilder::new();
    let route = RouteDefinition::new(Page::public("a")).with_name("same");
    builder.register_route("/a", route.clone()).unwrap();
    assert!(builder.register_route("/b", route).unwrap_err().is_conflict());

    builder
        .register_route("/c", RouteDefinition::new(Page::public("c")).with_name("same"))
        .unwrap();
    let router = builder.build().unwrap();

    assert_eq!(router.len(), 2);
    assert_eq!(router.route_by_name("same").unwrap().compiled.pattern(), "/a");
}

#[test]
fn test_strict_names_rejects_duplicates() {
    let mut builder = RouterBuilder::new();
    builder.strict_names(true);
    builder.register("/a", ()).unwrap().set_name("same");
    let second = builder.register("/b", ()).unwrap();
    second.set_name("same");
    let second = second.handle();

    match builder.build() {
        Err(RouterError::Conflict(handle)) => assert_eq!(handle, second),
        other => panic!("expected conflict, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_route_by_name_not_found() {
    let router = RouterBuilder::<()>::new().build().unwrap();
    assert!(router.is_empty());
    assert!(router.route_by_name("missing").unwrap_err().is_not_found());
}

#[test]
fn test_router_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Router<Page>>();
    assert_send_sync::<Router<HandlerRef>>();
}

// ============================================================================
// Field validators
// ============================================================================

fn guarded_router() -> Router<Page> {
    let mut builder = RouterBuilder::new();
    builder.add_field(role_field());
    builder.register("/admin", Page::guarded("admin", "admin")).unwrap();
    builder.register("/admin", Page::public("admin.login")).unwrap();
    builder.build().unwrap()
}

#[test]
fn test_field_stage_accepts_and_rejects() {
    let router = guarded_router();

    let admin = router.dispatch("/admin", [("role", "admin")]).unwrap().unwrap();
    assert_eq!(admin.abstraction().handler, "admin");

    let guest = router.dispatch("/admin", [("role", "guest")]).unwrap().unwrap();
    assert_eq!(guest.abstraction().handler, "admin.login");
}

#[test]
fn test_unit_announcer_rejects_guarded_routes() {
    let router = guarded_router();
    assert!(router.dispatch("/admin", ()).unwrap().is_none());
    assert!(router.query("/admin", ()).unwrap().is_empty());

    let mut query = router.query_builder("/admin");
    assert_eq!(query.missing_fields(), vec!["role"]);
    assert!(query.dispatch().unwrap().is_none());
}

#[test]
fn test_unit_announcer_matches_without_fields() {
    let mut builder = RouterBuilder::new();
    builder.register("/admin", Page::guarded("admin", "admin")).unwrap();
    let router = builder.build().unwrap();

    let resolved = router.dispatch("/admin", ()).unwrap().unwrap();
    assert_eq!(resolved.abstraction().handler, "admin");
}

#[test]
fn test_unannounced_field_rejects_candidates() {
    let router = guarded_router();
    let empty: Vec<(String, String)> = Vec::new();
    assert!(router.query("/admin", empty).unwrap().is_empty());
}

#[test]
fn test_announcer_receives_field_names() {
    let router = guarded_router();
    let announcer = |names: &[&str]| {
        names
            .iter()
            .map(|name| (name.to_string(), "admin".to_string()))
            .collect::<Vec<_>>()
    };
    assert_eq!(router.query("/admin", announcer).unwrap().len(), 2);
}

#[test]
fn test_unknown_field_announcement() {
    let router = guarded_router();
    let err = router.dispatch("/admin", [("locale", "en")]).unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::UnknownFilterName(name)) if name == "locale"
    ));

    let mut query = router.query_builder("/admin");
    assert!(query.announce("locale", "en").is_err());
    assert!(!query.validate_route_values());
    query.announce("role", "admin").unwrap();
    assert!(query.validate_route_values());
    assert_eq!(query.dispatch().unwrap().unwrap().abstraction().handler, "admin");
}

#[test]
fn test_undeclared_binding_fails_at_build() {
    let mut builder = RouterBuilder::new();
    builder.add_field(FieldValidator::new("host", |_, _| true).bind("host"));
    builder.register("/", Page::public("home")).unwrap();

    let err = builder.build().unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::UndeclaredProperty { field, property })
            if field == "host" && property == "host"
    ));
}

#[test]
fn test_validator_can_bind_route_name() {
    let mut builder = RouterBuilder::new();
    builder.add_field(
        FieldValidator::new("only", |value, props| props.get("name") == Some(value)).bind("name"),
    );
    builder.register("/x", ()).unwrap().set_name("first");
    builder.register("/x", ()).unwrap().set_name("second");
    let router = builder.build().unwrap();

    let resolved = router.dispatch("/x", [("only", "second")]).unwrap().unwrap();
    assert_eq!(resolved.name(), "second");
}

// ============================================================================
// Reverse path building
// ============================================================================

fn post_router() -> Router<()> {
    let mut builder = RouterBuilder::new();
    builder.add_tag("year", "[0-9]{4}").unwrap();
    builder
        .register("/posts/{year: [!:year:!]}/{slug: [a-z0-9-]+}.html", ())
        .unwrap()
        .set_name("post.show");
    builder.build().unwrap()
}

#[test]
fn test_build_path() {
    let router = post_router();
    let url = router
        .build_path_params("post.show", &[("slug", "hello"), ("year", "2024")])
        .unwrap();
    assert_eq!(url, "/posts/2024/hello.html");
}

#[test]
fn test_build_path_variable_mismatch() {
    let router = post_router();

    let err = router
        .build_path_params("post.show", &[("year", "2024"), ("page", "2")])
        .unwrap_err();
    match err.as_validation() {
        Some(ValidationError::ExtraneousOrMissingVariable {
            extraneous,
            missing,
            ..
        }) => {
            assert_eq!(extraneous, &vec!["page".to_string()]);
            assert_eq!(missing, &vec!["slug".to_string()]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_build_path_unknown_route() {
    let router = post_router();
    let err = router.build_path("missing", &HashMap::new()).unwrap_err();
    assert!(matches!(err, RouterError::RouteNotFound(name) if name == "missing"));
}

proptest! {
    #[test]
    fn prop_dispatch_inverts_build_path(
        year in 1000u32..10000,
        slug in "[a-z0-9-]{1,24}",
    ) {
        let router = post_router();
        let vars = HashMap::from([
            ("year".to_string(), year.to_string()),
            ("slug".to_string(), slug.clone()),
        ]);

        let path = router.build_path("post.show", &vars).unwrap();
        let resolved = router.dispatch(&path, ()).unwrap().unwrap();
        prop_assert_eq!(resolved.name(), "post.show");
        prop_assert_eq!(resolved.params_map(), vars);
    }

    // Default fragments accept any non-separator text, including regex
    // metacharacters, braces and a trailing ".html"
    #[test]
    fn prop_default_fragments_round_trip(
        a in "[^/]{1,16}",
        b in "[^/]{1,16}",
    ) {
        let mut builder = RouterBuilder::new();
        builder.register("/x/{a}/{b}.html", ()).unwrap().set_name("file");
        let router = builder.build().unwrap();

        let vars = HashMap::from([
            ("a".to_string(), a.clone()),
            ("b".to_string(), b.clone()),
        ]);

        let path = router.build_path("file", &vars).unwrap();
        prop_assert_eq!(&path, &format!("/x/{}/{}.html", a, b));

        let resolved = router.dispatch(&path, ()).unwrap().unwrap();
        prop_assert_eq!(resolved.param("a"), Some(a.as_str()));
        prop_assert_eq!(resolved.param("b"), Some(b.as_str()));
    }
}

// ============================================================================
// Collections and hooks
// ============================================================================

#[test]
fn test_mount_collection() {
    let mut users = RouteCollection::new();
    users.register("/", Page::public("users.index")).set_name("users");
    users
        .register("/{id: [0-9]+}", Page::public("users.show"))
        .set_name("user.show")
        .push_before(Page::public("auth"), 10)
        .push_after(Page::public("audit"), 0);

    let mut api = RouteCollection::new();
    api.mount("/users", users);

    let mut builder = RouterBuilder::new();
    let handles = builder.mount("/api", api).unwrap();
    let router = builder.build().unwrap();

    assert_eq!(handles.len(), 2);
    let resolved = router.dispatch("/api/users/5", ()).unwrap().unwrap();
    assert_eq!(resolved.name(), "user.show");
    assert_eq!(resolved.before()[0].abstraction.handler, "auth");
    assert_eq!(resolved.before()[0].priority, 10);
    assert_eq!(resolved.after()[0].abstraction.handler, "audit");

    assert_eq!(router.build_path_params("users", &[]).unwrap(), "/api/users/");
}

#[test]
fn test_route_mut_before_build() {
    let mut builder = RouterBuilder::new();
    let handle = builder.register("/", Page::public("home")).unwrap().handle();
    builder
        .route_mut(handle)
        .unwrap()
        .set_name("home")
        .push_before(Page::public("session"), 1);

    let router = builder.build().unwrap();
    let home = router.route_by_name("home").unwrap();
    assert_eq!(home.handle(), handle);
    assert_eq!(home.definition.before().len(), 1);
}
