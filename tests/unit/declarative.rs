//! Declarative tree tests: TOML fragment files in, composed document out.
//!
//! These cover the path the CLI takes, [`TreeSource`] feeding the composer,
//! which the module-level tests never exercise end to end: every builder
//! deserializing from its file form, stems and path parameters taken from
//! real file names, and unit paths surfacing in produce-time errors.

use stackweave::builder::{CompositeDocument, Composer};
use stackweave::constants::DEFAULT_TREE_ROOT;
use stackweave::core::ComposeError;
use stackweave::discovery::TreeSource;
use stackweave::fragment::ComposeContext;
use stackweave::test_utils::ProjectFixture;

use serde_json::json;

const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/app";

fn compose(project: &ProjectFixture) -> Result<CompositeDocument, ComposeError> {
    let context = ComposeContext::new("Api").with_default_role(ROLE_ARN);
    Composer::new(context)
        .with_root_construct("AWS::ApiGateway::RestApi", json!({ "Name": "users-api" }))
        .compose(TreeSource::new(project.path(DEFAULT_TREE_ROOT)))
}

#[test]
fn test_every_kind_composes_from_files() {
    let project = ProjectFixture::new()
        .fragment("users/route.toml", "kind = \"route\"\n")
        .fragment("users/get.toml", "kind = \"method\"\nfunction = \"handler\"\n")
        .fragment("users/handler.toml", "kind = \"function\"\nhandler = \"users.get\"\n")
        .fragment("users/store.toml", "kind = \"table\"\nhash_key = \"pk\"\n")
        .fragment("users/role.toml", "kind = \"policy\"\n")
        .fragment(
            "jobs/cleanup.toml",
            "kind = \"rule\"\nschedule = \"rate(1 day)\"\nfunction_key = \"FNUsersHandler\"\n",
        )
        .fragment(
            "edge/domain.toml",
            "kind = \"domain\"\ndomain_name = \"api.example.com\"\n\
             certificate_arn = \"arn:aws:acm:eu-west-1:123456789012:certificate/abc\"\n",
        );

    let document = compose(&project).unwrap();
    let keys: Vec<&str> = document.entries().iter().map(|e| e.key()).collect();
    assert_eq!(
        keys,
        [
            "Api",
            "DOMEdge",
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
    assert_eq!(document.get("DOMEdge").unwrap().kind(), "AWS::ApiGateway::DomainName");
    assert_eq!(document.get("POLUsers").unwrap().kind(), "AWS::IAM::Role");
    assert_eq!(
        document.get("RESUsers").unwrap().source(),
        "users/route.toml"
    );
}

#[test]
fn test_file_stems_name_node_members() {
    let project = ProjectFixture::new()
        .fragment("users/route.toml", "kind = \"route\"\n")
        .fragment("users/get.toml", "kind = \"method\"\n")
        .fragment("users/post.toml", "kind = \"method\"\n")
        .fragment("users/handler.toml", "kind = \"function\"\nhandler = \"users.main\"\n")
        .fragment("users/notify.toml", "kind = \"function\"\nhandler = \"users.notify\"\n");

    let document = compose(&project).unwrap();
    for key in ["METUsersGet", "METUsersPost", "FNUsersHandler", "FNUsersNotify"] {
        assert!(document.get(key).is_some(), "missing {key}");
    }
    assert_eq!(
        document.get("METUsersPost").unwrap().properties()["HttpMethod"],
        json!("POST")
    );
}

#[test]
fn test_path_parameter_directories() {
    let project = ProjectFixture::new()
        .fragment("users/route.toml", "kind = \"route\"\n")
        .fragment("users/{id}/route.toml", "kind = \"route\"\n")
        .fragment("users/{id}/get.toml", "kind = \"method\"\n");

    let document = compose(&project).unwrap();
    let child = document.get("RESUsersId").unwrap();
    assert_eq!(child.properties()["PathPart"], json!("{id}"));
    assert_eq!(child.properties()["ParentId"], json!({ "Ref": "RESUsers" }));

    let method = document.get("METUsersIdGet").unwrap();
    assert_eq!(method.properties()["ResourceId"], json!({ "Ref": "RESUsersId" }));
}

#[test]
fn test_produce_errors_name_the_fragment_file() {
    let project = ProjectFixture::new()
        .fragment("users/handler.toml", "kind = \"function\"\n");

    let err = compose(&project).unwrap_err();
    match err {
        ComposeError::Validation {
            fragment,
            reason,
        } => {
            assert_eq!(fragment, "users/handler.toml");
            assert!(reason.contains("'handler' is required"));
        }
        other => panic!("Expected Validation, got {other:?}"),
    }
}

#[test]
fn test_duplicate_key_reports_both_files() {
    let project = ProjectFixture::new()
        .fragment("users/store.toml", "kind = \"table\"\nhash_key = \"pk\"\n")
        .fragment("users/extra.toml", "kind = \"table\"\nhash_key = \"pk\"\n");

    let err = compose(&project).unwrap_err();
    match err {
        ComposeError::DuplicateKey {
            key,
            first_source,
            second_source,
        } => {
            assert_eq!(key, "TBLUsers");
            assert_eq!(first_source, "users/extra.toml");
            assert_eq!(second_source, "users/store.toml");
        }
        other => panic!("Expected DuplicateKey, got {other:?}"),
    }
}

#[test]
fn test_identical_trees_share_a_digest() {
    fn lay_out() -> ProjectFixture {
        ProjectFixture::new()
            .fragment("users/store.toml", "kind = \"table\"\nhash_key = \"pk\"\n")
            .fragment("users/route.toml", "kind = \"route\"\n")
            .fragment("jobs/nightly.toml", "kind = \"function\"\nhandler = \"jobs.nightly\"\n")
    }

    let first = compose(&lay_out()).unwrap().digest().unwrap();
    let second = compose(&lay_out()).unwrap().digest().unwrap();
    assert_eq!(first, second);
}
