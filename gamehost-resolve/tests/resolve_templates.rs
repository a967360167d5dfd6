use gamehost_core::SecretString;
use gamehost_ir::{EdgeKind, Resolution, ResourceNode, Value};
use gamehost_resolve::{ParameterSet, ResolveError, resolve, validate};
use gamehost_template::{Template, TemplateFile, builtin, parse_template};

const API_KEY: &str = "cf-5ecret-api-key";
const DOCKER_TOKEN: &str = "dckr_pat_5ecret";

fn builtin_template(name: &str) -> Template {
    TemplateFile::builtin(name).unwrap().into_template()
}

fn pixelmon_params() -> ParameterSet {
    let mut params = ParameterSet::new();
    params
        .insert("containerGroupName", "Pixelmon-Server")
        .insert("memoryInGB", 6i64)
        .insert_secure("curseForgeApiKey", SecretString::new(API_KEY.to_string()));
    params
}

fn multi_game_params() -> ParameterSet {
    let mut params = pixelmon_params();
    params
        .insert("dockerHubUsername", "pixelfan")
        .insert_secure(
            "dockerHubPersonalAccessToken",
            SecretString::new(DOCKER_TOKEN.to_string()),
        );
    params
}

fn resolve_builtin(name: &str, params: &ParameterSet) -> Result<Resolution, ResolveError> {
    resolve(&builtin_template(name), params)
}

/// Follow a path of object keys and array indices through a node's body.
fn lookup<'a>(node: &'a ResourceNode, path: &[&str]) -> &'a Value {
    let mut current = node
        .body
        .get(path[0])
        .unwrap_or_else(|| panic!("{} has no field '{}'", node.id, path[0]));
    for step in &path[1..] {
        current = match current {
            Value::Object(map) => &map[*step],
            Value::Array(items) => &items[step.parse::<usize>().unwrap()],
            other => panic!("cannot step into {} at '{}'", other.type_name(), step),
        };
    }
    current
}

/// Value of a container environment variable, by name.
fn env_var<'a>(group: &'a ResourceNode, container: usize, name: &str) -> &'a Value {
    let vars = lookup(
        group,
        &[
            "properties",
            "containers",
            &container.to_string(),
            "properties",
            "environmentVariables",
        ],
    );
    let Value::Array(vars) = vars else {
        panic!("environmentVariables is not an array");
    };
    vars.iter()
        .filter_map(Value::as_object)
        .find(|var| var.get("name") == Some(&Value::from(name)))
        .and_then(|var| var.get("value").or_else(|| var.get("secureValue")))
        .unwrap_or_else(|| panic!("no environment variable {}", name))
}

fn targets(node: &ResourceNode) -> Vec<&str> {
    node.depends_on.iter().map(|e| e.target.as_str()).collect()
}

#[test]
fn builtins_pass_validation_without_warnings() {
    for b in builtin::BUILTINS {
        let diagnostics = validate(&builtin_template(b.name)).unwrap();
        assert!(diagnostics.is_empty(), "{}: {:?}", b.name, diagnostics);
    }
}

#[test]
fn resolution_is_deterministic() {
    let render = || {
        let resolution = resolve_builtin("pixelmon-whitelist", &pixelmon_params()).unwrap();
        serde_json::to_string(&resolution).unwrap()
    };
    let first = render();
    let second = render();
    assert_eq!(first, second);
}

#[test]
fn secrets_never_appear_in_serialized_output() {
    let resolution = resolve_builtin("multi-game", &multi_game_params()).unwrap();
    assert!(resolution.graph.contains_secure());

    let json = serde_json::to_string_pretty(&resolution).unwrap();
    assert!(!json.contains(API_KEY));
    assert!(!json.contains(DOCKER_TOKEN));
    assert!(json.contains("[secure('curseForgeApiKey')]"));
    assert!(json.contains("[secure('dockerHubPersonalAccessToken')]"));

    let debug = format!("{:?}", resolution);
    assert!(!debug.contains(API_KEY));
}

#[test]
fn pixelmon_derived_values() {
    let resolution = resolve_builtin("pixelmon", &pixelmon_params()).unwrap();
    let group = resolution.graph.node("containerGroup").unwrap();

    assert_eq!(group.name, "Pixelmon-Server");
    assert_eq!(
        group.property("properties.ipAddress.dnsNameLabel"),
        Some(&Value::from("pixelmon-server"))
    );
    assert_eq!(env_var(group, 0, "MEMORY"), &Value::from("5G"));
    assert_eq!(
        lookup(
            group,
            &["properties", "containers", "0", "properties", "resources", "requests", "memoryInGB"]
        ),
        &Value::Int(6)
    );
    assert_eq!(group.body["location"], Value::from("eastus"));

    let storage = resolution.graph.node("storageAccount").unwrap();
    assert!(storage.name.starts_with("mc"));
    assert_eq!(storage.name.len(), 15);
    assert_eq!(
        lookup(group, &["properties", "volumes", "0", "azureFile", "storageAccountName"]),
        &Value::from(storage.name.as_str())
    );

    assert_eq!(
        resolution.outputs.get("ipAddress").unwrap().to_string(),
        "[reference('Pixelmon-Server').ipAddress.ip]"
    );
    assert_eq!(
        resolution.outputs.get("fqdn").unwrap().to_string(),
        "[reference('Pixelmon-Server').ipAddress.fqdn]"
    );
}

#[test]
fn pixelmon_dependency_edges() {
    let resolution = resolve_builtin("pixelmon", &pixelmon_params()).unwrap();
    let graph = &resolution.graph;

    let ids: Vec<&str> = graph.resources.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["storageAccount", "fileService", "fileShare", "containerGroup"]);

    let share = graph.node("fileShare").unwrap();
    assert_eq!(share.name, format!("{}/default/pixelmon-data", graph.resources[0].name));
    assert_eq!(share.depends_on[0].kind, EdgeKind::Parent);

    let group = graph.node("containerGroup").unwrap();
    assert_eq!(targets(group), ["fileShare", "storageAccount"]);
    assert_eq!(group.depends_on[0].kind, EdgeKind::Explicit);
    assert_eq!(group.depends_on[1].kind, EdgeKind::Reference);
}

#[test]
fn logging_disabled_leaves_out_workspace_and_diagnostics() {
    let resolution = resolve_builtin("pixelmon-logging", &pixelmon_params()).unwrap();
    let graph = &resolution.graph;

    assert!(graph.node("logAnalytics").is_none());
    assert!(graph.node("storageDiagnostics").is_none());
    assert!(graph.is_excluded("logAnalytics"));
    assert!(graph.is_excluded("storageDiagnostics"));
    assert_eq!(graph.len(), 4);

    let group = graph.node("containerGroup").unwrap();
    assert!(group.property("properties.diagnostics").is_none());
    assert!(!group.depends_on("logAnalytics"));

    assert_eq!(
        resolution.outputs.get_str("workspaceId"),
        Some("Log Analytics disabled")
    );
}

#[test]
fn logging_enabled_links_workspace() {
    let mut params = pixelmon_params();
    params.insert("enableLogAnalytics", true);
    let resolution = resolve_builtin("pixelmon-logging", &params).unwrap();
    let graph = &resolution.graph;

    let workspace = graph.node("logAnalytics").unwrap();
    assert_eq!(workspace.name, "Pixelmon-Server-logs");
    assert!(workspace.body.get("description").is_none());

    let diagnostics = graph.node("storageDiagnostics").unwrap();
    assert_eq!(targets(diagnostics), ["fileService", "logAnalytics"]);

    let group = graph.node("containerGroup").unwrap();
    assert!(group.depends_on("logAnalytics"));
    assert_eq!(
        group
            .property("properties.diagnostics.logAnalytics.logType")
            .and_then(Value::as_str),
        Some("ContainerInsights")
    );

    assert_eq!(
        resolution.outputs.get("workspaceId").unwrap().to_string(),
        "[reference('Pixelmon-Server-logs').customerId]"
    );
}

#[test]
fn spot_priority_follows_parameter() {
    let resolution = resolve_builtin("pixelmon-spot", &pixelmon_params()).unwrap();
    let group = resolution.graph.node("containerGroup").unwrap();
    assert_eq!(group.property("properties.priority"), Some(&Value::from("Spot")));

    let mut params = pixelmon_params();
    params.insert("spotInstance", false);
    let resolution = resolve_builtin("pixelmon-spot", &params).unwrap();
    let group = resolution.graph.node("containerGroup").unwrap();
    assert_eq!(group.property("properties.priority"), Some(&Value::from("Regular")));
}

#[test]
fn whitelist_union_has_no_duplicates() {
    let mut params = pixelmon_params();
    params
        .insert("whitelist", vec!["steve", "alex", "steve"])
        .insert("ops", vec!["alex", "notch"])
        .insert("serverName", "Pixelmon Reforged");
    let resolution = resolve_builtin("pixelmon-whitelist", &params).unwrap();
    let group = resolution.graph.node("containerGroup").unwrap();

    assert_eq!(env_var(group, 0, "WHITELIST"), &Value::from("steve,alex,notch"));
    assert_eq!(env_var(group, 0, "OPS"), &Value::from("alex,notch"));
    assert_eq!(env_var(group, 0, "ENABLE_WHITELIST"), &Value::from("true"));
    assert_eq!(env_var(group, 0, "MOTD"), &Value::from("Pixelmon Reforged"));
}

#[test]
fn empty_whitelist_disables_it() {
    let resolution = resolve_builtin("pixelmon-whitelist", &pixelmon_params()).unwrap();
    let group = resolution.graph.node("containerGroup").unwrap();

    assert_eq!(env_var(group, 0, "ENABLE_WHITELIST"), &Value::from("false"));
    assert_eq!(env_var(group, 0, "WHITELIST"), &Value::from(""));
}

#[test]
fn for_each_shares_keep_input_order() {
    let resolution = resolve_builtin("multi-game", &multi_game_params()).unwrap();
    let graph = &resolution.graph;

    let shares: Vec<&ResourceNode> = graph.instances_of("fileShares").collect();
    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].id, "fileShares[0]");
    assert_eq!(shares[1].id, "fileShares[1]");
    assert!(shares[0].name.ends_with("/default/pixelmon-data"));
    assert!(shares[1].name.ends_with("/default/terraria-data"));
    for share in &shares {
        assert_eq!(targets(share), ["fileService"]);
    }

    let group = graph.node("containerGroup").unwrap();
    assert_eq!(
        targets(group),
        ["fileShares[0]", "fileShares[1]", "storageAccount"]
    );
    assert_eq!(
        lookup(group, &["properties", "volumes", "1", "azureFile", "shareName"]),
        &Value::from("terraria-data")
    );
}

#[test]
fn duplicate_for_each_names_are_rejected() {
    let mut params = multi_game_params();
    params.insert("fileShareNames", vec!["worlds", "worlds"]);
    let err = resolve_builtin("multi-game", &params).unwrap_err();

    let ResolveError::DuplicateResourceName { first, second, .. } = &err else {
        panic!("expected DuplicateResourceName, got {:?}", err);
    };
    assert_eq!(first, "fileShares[0]");
    assert_eq!(second, "fileShares[1]");
}

#[test]
fn parameter_errors() {
    let mut params = ParameterSet::new();
    params.insert("containerGroupName", "Pixelmon-Server");
    let err = resolve_builtin("pixelmon", &params).unwrap_err();
    assert_eq!(err.to_string(), "missing required parameter 'curseForgeApiKey'");

    let mut params = pixelmon_params();
    params.insert("memoryInGB", 32i64);
    let err = resolve_builtin("pixelmon", &params).unwrap_err();
    assert_eq!(err.to_string(), "parameter 'memoryInGB' must be at most 16, found 32");

    let mut params = pixelmon_params();
    params.insert("curseForgeApiKey", API_KEY);
    let err = resolve_builtin("pixelmon", &params).unwrap_err();
    assert_eq!(err.kind(), "InsecureSecret");
    assert!(!err.to_string().contains(API_KEY));
}

fn custom(body: &str) -> Template {
    let src = format!("[template]\nname = \"custom\"\nversion = \"1.0.0\"\n\n{}", body);
    parse_template(&src, "custom.toml").unwrap()
}

#[test]
fn unguarded_read_of_excluded_resource_is_dangling() {
    let template = custom(
        r#"
[parameters.enableLogAnalytics]
type = "bool"
default = false
description = "Deploy the workspace"

[resources.logAnalytics]
type = "Microsoft.OperationalInsights/workspaces"
api_version = "2022-10-01"
condition = "${enableLogAnalytics}"
name = "logs"

[outputs.workspaceId]
type = "string"
value = "${logAnalytics.properties.customerId}"
"#,
    );

    let err = resolve(&template, &ParameterSet::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "'outputs.workspaceId' reads 'logAnalytics', which is excluded by its condition"
    );
}

const GATED_WORKSPACE: &str = r#"
[parameters.enableLogAnalytics]
type = "bool"
default = false
description = "Deploy the workspace"

[resources.logAnalytics]
type = "Microsoft.OperationalInsights/workspaces"
api_version = "2022-10-01"
condition = "${enableLogAnalytics}"
name = "logs"
"#;

#[test]
fn unused_variable_reading_excluded_resource_fails() {
    let template = custom(&format!(
        "{}
[variables]
workspaceId = \"${{logAnalytics.properties.customerId}}\"\n",
        GATED_WORKSPACE
    ));

    let err = resolve(&template, &ParameterSet::new()).unwrap_err();
    let ResolveError::DanglingReference { location, target } = &err else {
        panic!("expected DanglingReference, got {:?}", err);
    };
    assert_eq!(location, "variables.workspaceId");
    assert_eq!(target, "logAnalytics");
}

#[test]
fn guarded_variable_reading_excluded_resource_resolves() {
    let template = custom(&format!(
        "{}
[variables]
workspaceId = \"${{enableLogAnalytics ? logAnalytics.properties.customerId : null}}\"\n",
        GATED_WORKSPACE
    ));

    let resolution = resolve(&template, &ParameterSet::new()).unwrap();
    assert!(resolution.graph.is_excluded("logAnalytics"));
}

#[test]
fn unused_variable_with_bad_arithmetic_fails() {
    let template = custom(
        r#"
[variables]
ratio = "${1 / 0}"
"#,
    );

    let err = resolve(&template, &ParameterSet::new()).unwrap_err();
    assert_eq!(err.kind(), "InvalidExpression");
    assert_eq!(
        err.to_string(),
        "invalid expression in 'variables.ratio': division by zero"
    );
}

#[test]
fn explicit_dependency_on_excluded_resource_is_dropped() {
    let template = custom(&format!(
        r#"{}
[resources.storage]
type = "Microsoft.Storage/storageAccounts"
api_version = "2023-01-01"
name = "store"
depends_on = ["logAnalytics"]
"#,
        GATED_WORKSPACE
    ));

    let resolution = resolve(&template, &ParameterSet::new()).unwrap();
    let storage = resolution.graph.node("storage").unwrap();
    assert!(storage.depends_on.is_empty());
    assert!(!storage.depends_on("logAnalytics"));

    let mut params = ParameterSet::new();
    params.insert("enableLogAnalytics", true);
    let resolution = resolve(&template, &params).unwrap();
    let storage = resolution.graph.node("storage").unwrap();
    assert_eq!(targets(storage), ["logAnalytics"]);
}

#[test]
fn resource_names_differing_only_in_case_collide() {
    let template = custom(
        r#"
[resources.worlds]
type = "Microsoft.Storage/storageAccounts"
api_version = "2023-01-01"
name = "Worlds"

[resources.backups]
type = "microsoft.storage/storageaccounts"
api_version = "2023-01-01"
name = "worlds"
"#,
    );

    let err = resolve(&template, &ParameterSet::new()).unwrap_err();
    let ResolveError::DuplicateResourceName { name, first, second, .. } = &err else {
        panic!("expected DuplicateResourceName, got {:?}", err);
    };
    assert_eq!(name, "worlds");
    assert_eq!(first, "worlds");
    assert_eq!(second, "backups");
}

#[test]
fn secure_output_is_rejected() {
    let template = custom(
        r#"
[parameters.apiKey]
type = "string"
secure = true
description = "Key"

[outputs.leak]
type = "string"
value = "key=${apiKey}"
"#,
    );

    let mut params = ParameterSet::new();
    params.insert_secure("apiKey", SecretString::new(API_KEY.to_string()));
    let err = resolve(&template, &params).unwrap_err();
    assert_eq!(err.to_string(), "output 'leak' would expose a secure value");
}

#[test]
fn lint_errors_abort_resolution() {
    let template = custom(
        r#"
[variables]
maxMemory = "${memoryInGb - 1}G"
"#,
    );

    let err = resolve(&template, &ParameterSet::new()).unwrap_err();
    let ResolveError::InvalidTemplate { count, diagnostics } = &err else {
        panic!("expected InvalidTemplate, got {:?}", err);
    };
    assert_eq!(*count, 1);
    assert_eq!(diagnostics[0].source, "undeclared-reference");
}

#[test]
fn resolved_graph_json() {
    let template = custom(
        r#"
[parameters.fileShareNames]
type = "array"
default = ["pixelmon-data", "terraria-data"]
description = "Shares to create"

[resources.storage]
type = "Microsoft.Storage/storageAccounts"
api_version = "2023-01-01"
name = "mcdata"
sku = { name = "Standard_LRS" }

[resources.fileService]
type = "Microsoft.Storage/storageAccounts/fileServices"
api_version = "2023-01-01"
parent = "storage"
name = "default"

[resources.shares]
type = "Microsoft.Storage/storageAccounts/fileServices/shares"
api_version = "2023-01-01"
parent = "fileService"
for_each = "${fileShareNames}"
name = "${item}"

[resources.shares.properties]
shareQuota = 100
accessTier = "${index == 0 ? 'Hot' : null}"

[outputs.firstShare]
type = "string"
value = "${shares[0].name}"
"#,
    );

    let resolution = resolve(&template, &ParameterSet::new()).unwrap();
    let json = serde_json::to_string_pretty(&resolution).unwrap();
    insta::assert_snapshot!(json, @r#"
    {
      "template": {
        "name": "custom",
        "version": "1.0.0"
      },
      "resources": [
        {
          "id": "storage",
          "type": "Microsoft.Storage/storageAccounts",
          "apiVersion": "2023-01-01",
          "name": "mcdata",
          "sku": {
            "name": "Standard_LRS"
          }
        },
        {
          "id": "fileService",
          "type": "Microsoft.Storage/storageAccounts/fileServices",
          "apiVersion": "2023-01-01",
          "name": "mcdata/default",
          "dependsOn": [
            "storage"
          ]
        },
        {
          "id": "shares[0]",
          "type": "Microsoft.Storage/storageAccounts/fileServices/shares",
          "apiVersion": "2023-01-01",
          "name": "mcdata/default/pixelmon-data",
          "properties": {
            "shareQuota": 100,
            "accessTier": "Hot"
          },
          "dependsOn": [
            "fileService"
          ]
        },
        {
          "id": "shares[1]",
          "type": "Microsoft.Storage/storageAccounts/fileServices/shares",
          "apiVersion": "2023-01-01",
          "name": "mcdata/default/terraria-data",
          "properties": {
            "shareQuota": 100
          },
          "dependsOn": [
            "fileService"
          ]
        }
      ],
      "outputs": {
        "firstShare": {
          "type": "string",
          "value": "mcdata/default/pixelmon-data"
        }
      }
    }
    "#);
}
