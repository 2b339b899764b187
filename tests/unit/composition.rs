//! Pipeline tests over programmatic fragment sources.
//!
//! Everything here runs through [`Composer`] with a [`StaticSource`],
//! exercising the wiring between fragments that no single module test sees:
//! tokens produced by one resource builder resolving against entities
//! produced by another.

use serde_json::json;
use stackweave::builder::Composer;
use stackweave::core::ComposeError;
use stackweave::discovery::StaticSource;
use stackweave::fragment::{ComposeContext, Entity};
use stackweave::position::DirInfo;
use stackweave::resources::{
    FunctionFragment, MethodFragment, PolicyFragment, RouteFragment, RuleFragment, TableFragment,
};
use stackweave::test_utils::init_test_logging;

fn api_composer() -> Composer {
    Composer::new(ComposeContext::new("Api"))
        .with_root_construct("AWS::ApiGateway::RestApi", json!({ "Name": "users-api" }))
}

/// A small but complete service: a route with a proxying method, the
/// function behind it, its table and role, and a scheduled job.
fn user_service() -> StaticSource {
    StaticSource::new()
        .with_unit("users/route.toml", RouteFragment::new())
        .with_unit(
            "users/get.toml",
            MethodFragment::new("get").with_function("handler"),
        )
        .with_unit(
            "users/handler.toml",
            FunctionFragment::new("handler")
                .with_handler("users.get")
                .with_role("<% POLUsers %>")
                .with_environment("TABLE", "<% TBLUsers %>"),
        )
        .with_unit("users/store.toml", TableFragment::new("pk"))
        .with_unit("users/role.toml", PolicyFragment::new())
        .with_unit(
            "jobs/cleanup.toml",
            RuleFragment::new("cleanup")
                .with_schedule("rate(1 day)")
                .with_function_key("FNUsersHandler"),
        )
}

#[test]
fn test_service_composes_every_entity() {
    init_test_logging(None);
    let document = api_composer().compose(user_service()).unwrap();

    let keys: Vec<&str> = document.entries().iter().map(|e| e.key()).collect();
    assert_eq!(
        keys,
        [
            "Api",
            "EVTJobsCleanup",
            "EVTJobsCleanupPermission",
            "METUsersGet",
            "METUsersGetPermission",
            "FNUsersHandler",
            "RESUsers",
            "POLUsers",
            "TBLUsers",
        ]
    );
}

#[test]
fn test_method_integration_wires_to_function() {
    let document = api_composer().compose(user_service()).unwrap();
    let method = document.get("METUsersGet").unwrap();

    // The invocation URI is an Fn::Join whose token part resolved to the
    // function's ARN attribute.
    let uri_parts = method.properties()["Integration"]["Uri"]["Fn::Join"][1]
        .as_array()
        .unwrap();
    assert_eq!(
        uri_parts[3],
        json!({ "Fn::GetAtt": ["FNUsersHandler", "Arn"] })
    );

    let permission = document.get("METUsersGetPermission").unwrap();
    assert_eq!(permission.kind(), "AWS::Lambda::Permission");
    assert_eq!(
        permission.properties()["FunctionName"],
        json!({ "Ref": "FNUsersHandler" })
    );
    let arn_parts = permission.properties()["SourceArn"]["Fn::Join"][1]
        .as_array()
        .unwrap();
    assert_eq!(arn_parts[5], json!({ "Ref": "Api" }));
    assert_eq!(arn_parts[6], json!("/*/GET/users"));
}

#[test]
fn test_function_role_resolves_through_declared_attribute() {
    let document = api_composer().compose(user_service()).unwrap();
    let function = document.get("FNUsersHandler").unwrap();

    // POLUsers declares Arn as its reference attribute, so the bare role
    // token renders as Fn::GetAtt; the table token stays a plain Ref.
    assert_eq!(
        function.properties()["Role"],
        json!({ "Fn::GetAtt": ["POLUsers", "Arn"] })
    );
    assert_eq!(
        function.properties()["Environment"]["Variables"]["TABLE"],
        json!({ "Ref": "TBLUsers" })
    );
}

#[test]
fn test_attributed_token_overrides_declared_form() {
    let source = StaticSource::new()
        .with_unit("users/store.toml", TableFragment::new("pk").with_stream())
        .with_unit(
            "users/indexer.toml",
            FunctionFragment::new("indexer")
                .with_handler("indexer.run")
                .with_role("arn:aws:iam::123456789012:role/app")
                .with_environment("STREAM", "<% TBLUsers.StreamArn %>"),
        );

    let document = api_composer().compose(source).unwrap();
    assert_eq!(
        document.get("FNUsersIndexer").unwrap().properties()["Environment"]["Variables"]
            ["STREAM"],
        json!({ "Fn::GetAtt": ["TBLUsers", "StreamArn"] })
    );
}

#[test]
fn test_recomposition_digest_is_stable() {
    let first = api_composer().compose(user_service()).unwrap();
    let second = api_composer().compose(user_service()).unwrap();
    assert_eq!(first.digest().unwrap(), second.digest().unwrap());
    assert_eq!(
        first.to_json_string().unwrap(),
        second.to_json_string().unwrap()
    );
}

#[test]
fn test_source_registration_order_does_not_leak() {
    let forward = StaticSource::new()
        .with_unit("a/store.toml", TableFragment::new("pk"))
        .with_unit("b/store.toml", TableFragment::new("pk"));
    let backward = StaticSource::new()
        .with_unit("b/store.toml", TableFragment::new("pk"))
        .with_unit("a/store.toml", TableFragment::new("pk"));

    let first = api_composer().compose(forward).unwrap();
    let second = api_composer().compose(backward).unwrap();
    assert_eq!(first.digest().unwrap(), second.digest().unwrap());
}

#[test]
fn test_fragment_colliding_with_scope_key() {
    fn claims_scope(_dir: &DirInfo, ctx: &ComposeContext) -> Result<Vec<Entity>, ComposeError> {
        Ok(vec![Entity::new(ctx.scope_id(), "Custom::Thing", json!({}))])
    }
    let source = StaticSource::new().with_unit("users/thing.toml", claims_scope);

    let err = api_composer().compose(source).unwrap_err();
    match err {
        ComposeError::DuplicateKey {
            key,
            first_source,
            ..
        } => {
            assert_eq!(key, "Api");
            assert_eq!(first_source, "[scope]");
        }
        other => panic!("Expected DuplicateKey, got {other:?}"),
    }
}

#[test]
fn test_transliteration_collision_is_duplicate_key() {
    // Distinct directory names that normalize to the same identifier.
    let source = StaticSource::new()
        .with_unit("user-events/store.toml", TableFragment::new("pk"))
        .with_unit("user_events/store.toml", TableFragment::new("pk"));

    let err = api_composer().compose(source).unwrap_err();
    match err {
        ComposeError::DuplicateKey {
            key, ..
        } => assert_eq!(key, "TBLUserEvents"),
        other => panic!("Expected DuplicateKey, got {other:?}"),
    }
}

#[test]
fn test_unresolved_token_surfaces_through_pipeline() {
    fn dangling(_dir: &DirInfo, _ctx: &ComposeContext) -> Result<Vec<Entity>, ComposeError> {
        Ok(vec![Entity::new(
            "Watcher",
            "Custom::Watcher",
            json!({ "Target": "<% TBLUser %>" }),
        )])
    }
    let source = StaticSource::new()
        .with_unit("users/store.toml", TableFragment::new("pk"))
        .with_unit("users/watcher.toml", dangling);

    let err = api_composer().compose(source).unwrap_err();
    match err {
        ComposeError::UnresolvedToken {
            entity,
            token,
            closest,
        } => {
            assert_eq!(entity, "Watcher");
            assert_eq!(token, "<% TBLUser %>");
            assert_eq!(closest.as_deref(), Some("TBLUsers"));
        }
        other => panic!("Expected UnresolvedToken, got {other:?}"),
    }
}

#[test]
fn test_fragment_validation_names_its_unit() {
    let source = StaticSource::new().with_unit(
        "users/handler.toml",
        // No handler and no role anywhere.
        FunctionFragment::new("handler"),
    );

    let err = Composer::new(ComposeContext::new("Api"))
        .compose(source)
        .unwrap_err();
    match err {
        ComposeError::Validation {
            fragment,
            reason,
        } => {
            assert_eq!(fragment, "/users");
            assert!(reason.contains("handler"));
        }
        other => panic!("Expected Validation, got {other:?}"),
    }
}

#[test]
fn test_default_role_reaches_function_fragments() {
    let context =
        ComposeContext::new("Api").with_default_role("arn:aws:iam::123456789012:role/shared");
    let source = StaticSource::new().with_unit(
        "jobs/nightly.toml",
        FunctionFragment::new("nightly").with_handler("nightly.run"),
    );

    let document = Composer::new(context).compose(source).unwrap();
    assert_eq!(
        document.get("FNJobsNightly").unwrap().properties()["Role"],
        json!("arn:aws:iam::123456789012:role/shared")
    );
}
