//! Distribution descriptors generated from a built manifest.

use edge_deploy::build::{self, BuildContext};
use edge_deploy::cdn::{self, EdgeFunctions, Trigger};
use edge_deploy::config::load_config_from_str;
use edge_deploy::manifest::Manifest;
use edge_deploy::Error;

mod common;
use common::Fixture;

const STORAGE: &str = "https://app-assets.s3.us-east-1.amazonaws.com";

fn functions() -> EdgeFunctions {
    EdgeFunctions {
        page: "arn:aws:lambda:us-east-1:123:function:page:4".into(),
        api: "arn:aws:lambda:us-east-1:123:function:api:2".into(),
    }
}

async fn built_manifest(fixture: &Fixture) -> Manifest {
    let ctx = BuildContext::from_config(&fixture.config()).await.unwrap();
    build::run(&ctx).await.unwrap().compiled.manifest
}

#[tokio::test]
async fn test_user_behaviors_from_toml() {
    let fixture = Fixture::new();
    let manifest = built_manifest(&fixture).await;
    let config = load_config_from_str(
        r#"
        [cdn]
        price_class = "PriceClass_100"

        [cdn.defaults]
        default_ttl = 5
        triggers = { "origin-request" = "arn:user:1", "viewer-request" = "arn:user:2" }

        [[cdn.behaviors]]
        path = "api/*"
        triggers = { "origin-request" = "arn:user:3" }

        [[cdn.behaviors]]
        path = "blog/*"
        default_ttl = 60

        [[cdn.behaviors]]
        path = "/terms"
        max_ttl = 600
        "#,
    )
    .unwrap();

    let distribution = cdn::generate(&config.cdn, &manifest, STORAGE, &functions()).unwrap();

    assert_eq!(distribution.price_class, "PriceClass_100");
    assert_eq!(distribution.default_behavior.default_ttl, 5);
    assert_eq!(
        distribution.default_behavior.triggers[&Trigger::OriginRequest],
        functions().page
    );
    assert_eq!(
        distribution.default_behavior.triggers[&Trigger::ViewerRequest],
        "arn:user:2"
    );
    assert_eq!(
        distribution.behavior("api/*").unwrap().triggers[&Trigger::OriginRequest],
        functions().api
    );
    assert_eq!(distribution.behavior("blog/*").unwrap().default_ttl, 60);
    assert_eq!(distribution.behavior("terms").unwrap().max_ttl, 600);

    let json = serde_json::to_value(&distribution).unwrap();
    assert_eq!(json["origins"][0]["pathPatterns"][0]["pathPattern"], "_next/static/*");
    assert_eq!(json["defaultBehavior"]["forward"]["cookies"], "all");
}

#[tokio::test]
async fn test_unknown_path_rejected() {
    let fixture = Fixture::new();
    let manifest = built_manifest(&fixture).await;
    let config = load_config_from_str(
        r#"
        [[cdn.behaviors]]
        path = "some-invalid-page-route"
        "#,
    )
    .unwrap();

    let err = cdn::generate(&config.cdn, &manifest, STORAGE, &functions()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(err.to_string().contains("some-invalid-page-route"));
}

#[tokio::test]
async fn test_extra_origins_pass_through() {
    let fixture = Fixture::new();
    let manifest = built_manifest(&fixture).await;
    let config = load_config_from_str(
        r#"
        [[cdn.origins]]
        url = "https://legacy.example.com"

        [[cdn.origins.behaviors]]
        path = "/legacy/*"
        default_ttl = 10
        "#,
    )
    .unwrap();

    let distribution = cdn::generate(&config.cdn, &manifest, STORAGE, &functions()).unwrap();
    assert_eq!(distribution.origins.len(), 2);
    let legacy = &distribution.origins[1];
    assert_eq!(legacy.url, "https://legacy.example.com");
    assert!(!legacy.private);
    assert_eq!(legacy.path_patterns[0].path_pattern, "legacy/*");
    assert_eq!(legacy.path_patterns[0].behavior.default_ttl, 10);
}
