use chrono::Duration;
use rdp_core::domain::metadata::MetadataAdd;
use rdp_core::{
    Capability, Clock, Content, DataBundle, ManualClock, MetadataBundle, PersistentIdentifier, PidKind,
    RdpError, RdpFactory, ResearchDataProduct, SchemaValidator, Service, ServiceBundle,
    ValidationReport, Value,
};
use std::sync::Arc;

/// Accepts `dublin-core` records that carry a title.
struct StubSchema;

impl SchemaValidator for StubSchema {
    fn validate(&self, content: &Content, schema_ref: &str) -> ValidationReport {
        match (schema_ref, content.get("title")) {
            ("dublin-core", Some(_)) => ValidationReport::passed(),
            ("dublin-core", None) => ValidationReport::failed(vec!["title is required".into()]),
            _ => ValidationReport::failed(vec![format!("unknown schema {}", schema_ref)]),
        }
    }
}

fn title(text: &str) -> Content {
    let mut content = Content::new();
    content.insert("title".to_string(), Value::from(text));
    content
}

fn empty_rdp(pid: &str) -> ResearchDataProduct {
    ResearchDataProduct::create(
        Some(PersistentIdentifier::create(PidKind::Doi, pid).unwrap()),
        ServiceBundle::new(),
        MetadataBundle::new(),
        DataBundle::new(),
    )
    .unwrap()
}

#[test]
fn test_service_resolution_end_to_end() {
    let clock = ManualClock::default();
    let rdp = empty_rdp("10.1234/example");
    assert_eq!(rdp.pid().value(), "10.1234/example");

    let service = Service::create(
        "https",
        "https://example.org/meta",
        [Capability::MetadataAccess],
        &clock,
    )
    .unwrap();
    rdp.add_service(service.clone());

    let resolved = rdp.resolve_service(Capability::MetadataAccess).unwrap();
    assert_eq!(*resolved, service);
    assert!(rdp.resolve_service(Capability::DataAccess).is_none());
}

#[test]
fn test_metadata_supersession_end_to_end() {
    let clock = Arc::new(ManualClock::default());
    let factory = RdpFactory::new(clock.clone(), Arc::new(StubSchema));
    let rdp = empty_rdp("10.1234/example");

    assert_eq!(
        factory.record_metadata(&rdp, title("x"), "dublin-core").unwrap(),
        MetadataAdd::Added
    );
    let first = rdp.metadata_for("dublin-core").unwrap();
    assert_eq!(first.get("title").and_then(Value::as_str), Some("x"));

    clock.advance(Duration::seconds(30));
    factory.record_metadata(&rdp, title("y"), "dublin-core").unwrap();

    let latest = rdp.metadata_for("dublin-core").unwrap();
    assert_eq!(latest.get("title").and_then(Value::as_str), Some("y"));

    let all = rdp.metadata().entries();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|m| m.as_ref() == first.as_ref()));
}

#[test]
fn test_invalid_metadata_leaves_bundle_unchanged() {
    let factory = RdpFactory::new(Arc::new(ManualClock::default()), Arc::new(StubSchema));
    let rdp = empty_rdp("10.1234/example");
    factory.record_metadata(&rdp, title("kept"), "dublin-core").unwrap();

    let err = factory
        .record_metadata(&rdp, Content::new(), "dublin-core")
        .unwrap_err();
    assert!(matches!(err, RdpError::SchemaValidationError { .. }));
    assert_eq!(rdp.metadata().len(), 1);
    assert_eq!(
        rdp.metadata_for("dublin-core")
            .unwrap()
            .get("title")
            .and_then(Value::as_str),
        Some("kept")
    );
}

#[test]
fn test_select_with_two_services_differing_only_in_time() {
    let clock = ManualClock::default();
    let bundle = ServiceBundle::new();
    let earlier = Service::create("https", "https://a.example/api", [Capability::DataAccess], &clock)
        .unwrap();
    clock.advance(Duration::milliseconds(1));
    let later = Service::create("https", "https://b.example/api", [Capability::DataAccess], &clock)
        .unwrap();
    bundle.add(later);
    bundle.add(earlier);
    assert_eq!(
        bundle.select(Capability::DataAccess).unwrap().endpoint(),
        "https://b.example/api"
    );
}

#[test]
fn test_missing_identifier_is_rejected() {
    let result = ResearchDataProduct::create(
        None,
        ServiceBundle::new(),
        MetadataBundle::new(),
        DataBundle::new(),
    );
    assert!(matches!(result, Err(RdpError::MissingIdentifier)));
}

#[test]
fn test_prepopulated_bundles_are_kept() {
    let clock = ManualClock::default();
    let services = ServiceBundle::new();
    services.add(
        Service::create("s3", "s3://bucket/rdp-42", [Capability::DataAccess], &clock).unwrap(),
    );
    let data = DataBundle::new();
    data.add("s3://bucket/rdp-42/table.tsv", clock.now()).unwrap();

    let rdp = ResearchDataProduct::create(
        Some(PersistentIdentifier::parse("20.500.12345/rdp-42").unwrap()),
        services,
        MetadataBundle::new(),
        data,
    )
    .unwrap();
    assert_eq!(rdp.pid().kind(), PidKind::Handle);
    assert_eq!(rdp.services().len(), 1);
    assert!(rdp.data().references()[0].is_tabular());
}
