use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use ctlinv_api::requests::{InventoryLookup, ScriptQuery};
use ctlinv_api::responses::{InventoryList, ServerConfig};
use ctlinv_api::script::RawInventoryDocument;
use ctlinv_client::{ClientError, ControllerApi};
use ctlinv_core::*;

// Mock implementation recording every endpoint hit
struct MockApi {
    lookup: Value,
    script: Value,
    config: Value,
    script_status: Option<u16>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    fn new(lookup: Value, script: Value) -> Self {
        Self {
            lookup,
            script,
            config: json!({}),
            script_status: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    fn failing_script(mut self, status: u16) -> Self {
        self.script_status = Some(status);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ControllerApi for MockApi {
    async fn lookup_inventory(
        &self,
        lookup: &InventoryLookup,
    ) -> ctlinv_client::Result<InventoryList> {
        match &lookup.organization {
            Some(org) => self.record(format!("lookup:{}@{org}", lookup.name)),
            None => self.record(format!("lookup:{}", lookup.name)),
        }
        Ok(serde_json::from_value(self.lookup.clone())?)
    }

    async fn inventory_script(
        &self,
        inventory_id: &str,
        query: ScriptQuery,
    ) -> ctlinv_client::Result<RawInventoryDocument> {
        assert_eq!(query, ScriptQuery::default());
        self.record(format!("script:{inventory_id}"));
        if let Some(status) = self.script_status {
            return Err(ClientError::Api {
                status,
                message: "{\"detail\": \"nope\"}".to_string(),
            });
        }
        Ok(serde_json::from_value(self.script.clone())?)
    }

    async fn server_config(&self) -> ctlinv_client::Result<ServerConfig> {
        self.record("config".to_string());
        Ok(serde_json::from_value(self.config.clone())?)
    }
}

fn scenario_document() -> Value {
    json!({
        "all": {"hosts": ["h1", "h2"], "vars": {}},
        "g1": {"hosts": ["h1"], "children": [], "vars": {"env": "prod"}},
        "_meta": {"hostvars": {"h1": {"ip": "10.0.0.1"}, "h2": {"ip": "10.0.0.2"}}}
    })
}

fn found(id: Value) -> Value {
    json!({"count": 1, "results": [{"id": id, "name": "prod"}]})
}

fn options(inventory: InventoryRef, filters: FilterOptions) -> Options {
    Options {
        host: "https://controller.example.com".to_string(),
        username: "admin".to_string(),
        password: "secret".to_string(),
        inventory,
        filters,
        validate_certs: true,
        include_metadata: false,
    }
}

fn by_name() -> InventoryRef {
    InventoryRef::Name("prod".to_string())
}

fn filters(hosts: Option<&str>, hostgroups: Option<&str>, groups: Option<&str>) -> FilterOptions {
    FilterOptions {
        hosts: hosts.map(str::to_string),
        hostgroups: hostgroups.map(str::to_string),
        groups: groups.map(str::to_string),
    }
}

async fn run(api: Arc<MockApi>, options: Options) -> Result<InventoryGraph> {
    InventoryPlugin::new(options, api)?.run().await
}

fn keys<V>(map: &std::collections::BTreeMap<String, V>) -> Vec<&str> {
    map.keys().map(String::as_str).collect()
}

#[tokio::test]
async fn test_unfiltered_scenario() {
    let api = Arc::new(MockApi::new(found(json!(42)), scenario_document()));
    let graph = run(api.clone(), options(by_name(), FilterOptions::default()))
        .await
        .unwrap();

    assert_eq!(api.calls(), vec!["lookup:prod", "script:42"]);
    assert_eq!(keys(graph.groups()), vec!["all", "g1"]);
    assert_eq!(keys(graph.hosts()), vec!["h1", "h2"]);
    let g1 = graph.group("g1").unwrap();
    assert_eq!(g1.vars()["env"], json!("prod"));
    assert!(g1.hosts().contains("h1"));
    assert!(!g1.hosts().contains("h2"));
}

#[tokio::test]
async fn test_hosts_filter_scenario() {
    let api = Arc::new(MockApi::new(found(json!(42)), scenario_document()));
    let graph = run(api, options(by_name(), filters(Some("h1"), None, None)))
        .await
        .unwrap();

    assert_eq!(keys(graph.hosts()), vec!["h1"]);
    assert_eq!(graph.group("g1").unwrap().vars()["env"], json!("prod"));
    assert!(graph.groups().values().all(|g| !g.hosts().contains("h2")));
}

#[tokio::test]
async fn test_groups_filter_scenario() {
    let document = json!({
        "all": {"hosts": [], "vars": {}},
        "g1": {"hosts": ["h1"], "vars": {}},
        "g2": {"hosts": ["h2", "h3"], "children": ["g1"], "vars": {"role": "db"}},
        "_meta": {"hostvars": {"h1": {}, "h2": {}, "h3": {}}}
    });
    let api = Arc::new(MockApi::new(found(json!(1)), document));
    let graph = run(api, options(by_name(), filters(None, None, Some("^g1$"))))
        .await
        .unwrap();

    assert_eq!(keys(graph.groups()), vec!["all", "g1"]);
    assert_eq!(keys(graph.hosts()), vec!["h1"]);
}

#[tokio::test]
async fn test_empty_lookup_fails_before_script() {
    let api = Arc::new(MockApi::new(json!({"results": []}), scenario_document()));
    let err = run(api.clone(), options(by_name(), FilterOptions::default()))
        .await
        .unwrap_err();

    assert!(matches!(err, InventoryError::Lookup(_)));
    assert!(err.to_string().contains("prod"));
    assert_eq!(api.calls(), vec!["lookup:prod"]);
}

#[tokio::test]
async fn test_numeric_name_is_looked_up() {
    let api = Arc::new(MockApi::new(found(json!(42)), scenario_document()));
    let inventory = InventoryRef::from_value(&json!(2024)).unwrap();
    run(api.clone(), options(inventory, FilterOptions::default()))
        .await
        .unwrap();

    assert_eq!(api.calls(), vec!["lookup:2024", "script:42"]);

    let api = Arc::new(MockApi::new(found(json!(42)), scenario_document()));
    run(api.clone(), options(InventoryRef::parse("2024").unwrap(), FilterOptions::default()))
        .await
        .unwrap();

    assert_eq!(api.calls(), vec!["lookup:2024", "script:42"]);
}

#[tokio::test]
async fn test_name_sent_without_trimming() {
    let api = Arc::new(MockApi::new(found(json!(42)), scenario_document()));
    run(api.clone(), options(InventoryRef::parse(" prod ").unwrap(), FilterOptions::default()))
        .await
        .unwrap();

    assert_eq!(api.calls(), vec!["lookup: prod ", "script:42"]);
}

#[tokio::test]
async fn test_slug_lookup_uses_organization() {
    let api = Arc::new(MockApi::new(found(json!("9/")), scenario_document()));
    let inventory = InventoryRef::Slug {
        name: "prod".to_string(),
        organization: "Ops".to_string(),
    };
    run(api.clone(), options(inventory, FilterOptions::default()))
        .await
        .unwrap();

    assert_eq!(api.calls(), vec!["lookup:prod@Ops", "script:9"]);
}

#[tokio::test]
async fn test_metadata_attached_when_enabled() {
    let api = Arc::new(
        MockApi::new(found(json!(42)), scenario_document()).with_config(json!({
            "license_info": {"license_type": "enterprise"},
            "version": "4.5.0"
        })),
    );
    let mut opts = options(by_name(), filters(Some("nothing-matches"), None, None));
    opts.include_metadata = true;
    let graph = run(api.clone(), opts).await.unwrap();

    assert_eq!(api.calls(), vec!["lookup:prod", "script:42", "config"]);
    assert_eq!(
        graph.root().vars()[METADATA_VAR],
        json!({"license_type": "enterprise", "version": "4.5.0", "ansible_version": "unknown"})
    );
    assert!(graph.hosts().is_empty());
}

#[tokio::test]
async fn test_metadata_not_fetched_by_default() {
    let api = Arc::new(MockApi::new(found(json!(42)), scenario_document()));
    let graph = run(api.clone(), options(by_name(), FilterOptions::default()))
        .await
        .unwrap();

    assert!(!api.calls().contains(&"config".to_string()));
    assert!(graph.root().vars().get(METADATA_VAR).is_none());
}

#[tokio::test]
async fn test_invalid_regex_fails_before_network() {
    let api = Arc::new(MockApi::new(found(json!(42)), scenario_document()));
    let err = InventoryPlugin::new(
        options(by_name(), filters(None, None, Some("[unclosed"))),
        api.clone(),
    )
    .unwrap_err();

    assert!(err.is_config());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_transport_error_aborts_run() {
    let api = Arc::new(MockApi::new(found(json!(42)), scenario_document()).failing_script(500));
    let mut opts = options(by_name(), FilterOptions::default());
    opts.include_metadata = true;
    let err = run(api.clone(), opts).await.unwrap_err();

    assert!(matches!(err, InventoryError::Transport(_)));
    assert!(err.to_string().contains("nope"));
    assert_eq!(api.calls(), vec!["lookup:prod", "script:42"]);
}

#[tokio::test]
async fn test_malformed_document_is_parse_error() {
    let api = Arc::new(MockApi::new(found(json!(42)), json!({"g1": 17})));
    let err = run(api, options(by_name(), FilterOptions::default()))
        .await
        .unwrap_err();

    assert!(matches!(err, InventoryError::Parse(_)));
}

#[tokio::test]
async fn test_child_group_loop_is_parse_error() {
    let document = json!({
        "a": {"hosts": ["h1"], "children": ["b"]},
        "b": {"children": ["a"]},
        "_meta": {"hostvars": {"h1": {}}}
    });
    let mut opts = options(by_name(), FilterOptions::default());
    opts.include_metadata = true;
    let api = Arc::new(MockApi::new(found(json!(42)), document));
    let err = run(api.clone(), opts).await.unwrap_err();

    assert!(matches!(err, InventoryError::Parse(_)));
    assert!(err.to_string().contains("loop"));
    assert_eq!(api.calls(), vec!["lookup:prod", "script:42"]);
}

#[tokio::test]
async fn test_runs_are_idempotent() {
    let api = Arc::new(MockApi::new(found(json!(42)), scenario_document()));
    let plugin = InventoryPlugin::new(
        options(by_name(), filters(Some("h"), Some("g1|all"), Some("g"))),
        api,
    )
    .unwrap();

    let first = plugin.run().await.unwrap();
    let second = plugin.run().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_ansible_json(), second.to_ansible_json());
}

/// A host survives iff it has hostvars, passes the host filter, and is
/// listed under some admitted group whose hosts are scanned.
#[tokio::test]
async fn test_host_admission_property() {
    let document = json!({
        "all": {"hosts": ["web-1"], "vars": {"dc": "eu"}},
        "web": {"hosts": ["web-1", "web-2"], "children": ["web-canary"], "vars": {"tier": "fe"}},
        "web-canary": {"hosts": ["web-3"]},
        "db": {"hosts": ["db-1", "web-2", "orphan"], "children": ["web"]},
        "meta-keep": {"hosts": ["db-2"]},
        "_meta": {"hostvars": {
            "web-1": {}, "web-2": {}, "web-3": {}, "db-1": {}, "db-2": {}, "unlisted": {}
        }}
    });
    let raw: RawInventoryDocument = serde_json::from_value(document.clone()).unwrap();

    let patterns = [None, Some("web"), Some("^db"), Some("-1$"), Some("^meta-|canary")];
    for hosts in patterns {
        for hostgroups in patterns {
            for groups in patterns {
                let api = Arc::new(MockApi::new(found(json!(1)), document.clone()));
                let graph = run(api, options(by_name(), filters(hosts, hostgroups, groups)))
                    .await
                    .unwrap();
                let set = FilterSet::new(hosts, hostgroups, groups).unwrap();

                let admitted_groups: BTreeSet<&str> = raw
                    .groups
                    .keys()
                    .map(String::as_str)
                    .filter(|g| set.admit_group(g))
                    .collect();
                let expected_hosts: BTreeSet<&str> = raw
                    .meta
                    .hostvars
                    .keys()
                    .map(String::as_str)
                    .filter(|h| set.admit_host(h))
                    .filter(|h| {
                        admitted_groups.iter().any(|g| {
                            set.admit_hosts_in_group(g)
                                && raw.groups[*g].hosts.iter().any(|x| x == *h)
                        })
                    })
                    .collect();

                let actual_hosts: BTreeSet<&str> =
                    graph.hosts().keys().map(String::as_str).collect();
                let actual_groups: BTreeSet<&str> =
                    graph.groups().keys().map(String::as_str).collect();

                let case = format!("{hosts:?} {hostgroups:?} {groups:?}");
                assert_eq!(actual_hosts, expected_hosts, "hosts for {case}");
                assert_eq!(actual_groups, admitted_groups, "groups for {case}");

                for group in graph.groups().values() {
                    for child in group.children() {
                        assert!(actual_groups.contains(child.as_str()), "child {child} for {case}");
                    }
                    for host in group.hosts() {
                        assert!(actual_hosts.contains(host.as_str()), "member {host} for {case}");
                    }
                    // Group vars do not depend on host filtering.
                    if let Some(raw_group) = raw.groups.get(group.name()) {
                        for (key, value) in &raw_group.vars {
                            assert_eq!(group.vars().get(key), Some(value), "vars for {case}");
                        }
                    }
                }
            }
        }
    }
}
