//! GitHub GraphQL (v4) implementation of [`ProjectSource`].
//!
//! Every query is a static document parameterised only through GraphQL
//! variables: node ids, field names and page sizes. Response bodies are
//! decoded into private wire types mirroring the selection sets and then
//! converted into the canonical records of [`crate::source`].

use super::{
    FieldRecord, FieldValue, ItemRecord, LabelRecord, ProjectRef, ProjectSchema, ProjectSource,
    SourceError, FIELD_BEGAN_AT, FIELD_ENDED_AT, FIELD_IMPACT_TYPE, FIELD_LABELS, FIELD_STATUS,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Default public GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

/// Repositories linked to the project read per query.
pub const REPOSITORY_PAGE_SIZE: u32 = 10;
/// Labels read per linked repository.
pub const LABEL_PAGE_SIZE: u32 = 100;
/// Issues read per label when collecting `affectedBy`.
pub const LABEL_ISSUE_PAGE_SIZE: u32 = 10;
/// Project items read per issue when collecting `affectedBy`.
pub const ISSUE_ITEM_PAGE_SIZE: u32 = 10;
/// Project items read by the incident listing.
pub const ITEM_PAGE_SIZE: u32 = 10;
/// Labels read from the labels field of one project item.
pub const ITEM_LABEL_PAGE_SIZE: u32 = 10;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("statuspage/", env!("CARGO_PKG_VERSION"));

macro_rules! field_shape_fragment {
    () => {
        r#"
fragment FieldShape on ProjectV2FieldConfiguration {
  __typename
  ... on ProjectV2SingleSelectField { options { name } }
  ... on ProjectV2Field { dataType }
  ... on ProjectV2IterationField { dataType }
}
"#
    };
}

macro_rules! component_label_fragment {
    () => {
        r#"
fragment ComponentLabel on Label {
  id
  name
  description
  issues(first: $issues) {
    nodes { projectItems(first: $items) { nodes { id } } }
  }
}
"#
    };
}

macro_rules! incident_item_fragment {
    () => {
        r#"
fragment IncidentItem on ProjectV2Item {
  id
  content {
    __typename
    ... on Issue { title }
    ... on DraftIssue { title }
  }
  phase: fieldValueByName(name: $status) { ...ItemValue }
  impactType: fieldValueByName(name: $impactType) { ...ItemValue }
  beganAt: fieldValueByName(name: $beganAt) { ...ItemValue }
  endedAt: fieldValueByName(name: $endedAt) { ...ItemValue }
  labels: fieldValueByName(name: $labelsField) { ...ItemValue }
}

fragment ItemValue on ProjectV2ItemFieldValue {
  __typename
  ... on ProjectV2ItemFieldSingleSelectValue { name }
  ... on ProjectV2ItemFieldTextValue { text }
  ... on ProjectV2ItemFieldLabelValue { labels(first: $labels) { nodes { id } } }
}
"#
    };
}

const FIND_USER_PROJECT: &str = r#"
query FindUserProject($login: String!, $number: Int!) {
  user(login: $login) {
    projectV2(number: $number) { id number }
  }
}
"#;

const PROJECT_SCHEMA: &str = concat!(
    r#"
query ProjectSchema($projectId: ID!, $repositories: Int!, $labels: Int!, $status: String!, $impactType: String!, $beganAt: String!, $endedAt: String!) {
  node(id: $projectId) {
    __typename
    ... on ProjectV2 {
      repositories(first: $repositories) {
        nodes { labels(first: $labels) { nodes { id name description } } }
      }
      status: field(name: $status) { ...FieldShape }
      impactType: field(name: $impactType) { ...FieldShape }
      beganAt: field(name: $beganAt) { ...FieldShape }
      endedAt: field(name: $endedAt) { ...FieldShape }
    }
  }
}
"#,
    field_shape_fragment!()
);

const REPOSITORY_LABELS: &str = concat!(
    r#"
query RepositoryLabels($projectId: ID!, $repositories: Int!, $labels: Int!, $issues: Int!, $items: Int!) {
  node(id: $projectId) {
    __typename
    ... on ProjectV2 {
      repositories(first: $repositories) {
        nodes { labels(first: $labels) { nodes { ...ComponentLabel } } }
      }
    }
  }
}
"#,
    component_label_fragment!()
);

const LABEL: &str = concat!(
    r#"
query Label($labelId: ID!, $issues: Int!, $items: Int!) {
  node(id: $labelId) {
    __typename
    ... on Label { ...ComponentLabel }
  }
}
"#,
    component_label_fragment!()
);

const FIELD_OPTIONS: &str = concat!(
    r#"
query FieldOptions($projectId: ID!, $field: String!) {
  node(id: $projectId) {
    __typename
    ... on ProjectV2 {
      field(name: $field) { ...FieldShape }
    }
  }
}
"#,
    field_shape_fragment!()
);

const PROJECT_ITEMS: &str = concat!(
    r#"
query ProjectItems($projectId: ID!, $first: Int!, $labels: Int!, $status: String!, $impactType: String!, $beganAt: String!, $endedAt: String!, $labelsField: String!) {
  node(id: $projectId) {
    __typename
    ... on ProjectV2 {
      items(first: $first) { nodes { ...IncidentItem } }
    }
  }
}
"#,
    incident_item_fragment!()
);

const PROJECT_ITEM: &str = concat!(
    r#"
query ProjectItem($itemId: ID!, $labels: Int!, $status: String!, $impactType: String!, $beganAt: String!, $endedAt: String!, $labelsField: String!) {
  node(id: $itemId) {
    __typename
    ... on ProjectV2Item { ...IncidentItem }
  }
}
"#,
    incident_item_fragment!()
);

/// Project source backed by the GitHub GraphQL API.
///
/// Uses a blocking HTTP agent; callers running inside an async runtime are
/// expected to move calls onto a blocking thread.
#[derive(Clone)]
pub struct GitHubSource {
    agent: ureq::Agent,
    endpoint: String,
    token: String,
}

impl GitHubSource {
    /// Create a source talking to a GraphQL endpoint, [`DEFAULT_ENDPOINT`]
    /// or a GitHub Enterprise one.
    pub fn with_endpoint(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(config),
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, SourceError> {
        let request = GraphQlRequest { query, variables };

        let mut response = self
            .agent
            .post(self.endpoint.as_str())
            .header("Authorization", format!("bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .send_json(&request)
            .map_err(|e| self.http_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(self.http_error(format!("status {}: {}", status, body.trim())));
        }

        let envelope: GraphQlResponse<T> = response
            .body_mut()
            .read_json()
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        envelope.into_data()
    }

    fn http_error(&self, message: String) -> SourceError {
        SourceError::Http {
            endpoint: self.endpoint.clone(),
            message,
        }
    }
}

impl ProjectSource for GitHubSource {
    fn find_user_project(&self, login: &str, number: u64) -> Result<ProjectRef, SourceError> {
        let data: FindUserProjectData = self.execute(
            FIND_USER_PROJECT,
            json!({ "login": login, "number": number }),
        )?;
        data.into_project_ref(login, number)
    }

    fn project_schema(&self, project_id: &str) -> Result<ProjectSchema, SourceError> {
        let data: NodeData = self.execute(
            PROJECT_SCHEMA,
            json!({
                "projectId": project_id,
                "repositories": REPOSITORY_PAGE_SIZE,
                "labels": LABEL_PAGE_SIZE,
                "status": FIELD_STATUS,
                "impactType": FIELD_IMPACT_TYPE,
                "beganAt": FIELD_BEGAN_AT,
                "endedAt": FIELD_ENDED_AT,
            }),
        )?;
        Ok(data
            .expect_node::<SchemaProjectNode>("ProjectV2", project_id)?
            .into_schema())
    }

    fn repository_labels(&self, project_id: &str) -> Result<Vec<LabelRecord>, SourceError> {
        let data: NodeData = self.execute(
            REPOSITORY_LABELS,
            json!({
                "projectId": project_id,
                "repositories": REPOSITORY_PAGE_SIZE,
                "labels": LABEL_PAGE_SIZE,
                "issues": LABEL_ISSUE_PAGE_SIZE,
                "items": ISSUE_ITEM_PAGE_SIZE,
            }),
        )?;
        Ok(data
            .expect_node::<LabelsProjectNode>("ProjectV2", project_id)?
            .into_labels())
    }

    fn label(&self, label_id: &str) -> Result<LabelRecord, SourceError> {
        let data: NodeData = self.execute(
            LABEL,
            json!({
                "labelId": label_id,
                "issues": LABEL_ISSUE_PAGE_SIZE,
                "items": ISSUE_ITEM_PAGE_SIZE,
            }),
        )?;
        Ok(data.expect_node::<LabelNode>("Label", label_id)?.into_record())
    }

    fn field_options(&self, project_id: &str, field: &str) -> Result<Vec<String>, SourceError> {
        let data: NodeData = self.execute(
            FIELD_OPTIONS,
            json!({ "projectId": project_id, "field": field }),
        )?;
        let node: FieldProjectNode = data.expect_node("ProjectV2", project_id)?;
        Ok(into_field_record(node.field).options().to_vec())
    }

    fn project_items(&self, project_id: &str) -> Result<Vec<ItemRecord>, SourceError> {
        let mut variables = item_variables();
        variables["projectId"] = json!(project_id);
        variables["first"] = json!(ITEM_PAGE_SIZE);

        let data: NodeData = self.execute(PROJECT_ITEMS, variables)?;
        Ok(data
            .expect_node::<ItemsProjectNode>("ProjectV2", project_id)?
            .into_items())
    }

    fn project_item(&self, item_id: &str) -> Result<ItemRecord, SourceError> {
        let mut variables = item_variables();
        variables["itemId"] = json!(item_id);

        let data: NodeData = self.execute(PROJECT_ITEM, variables)?;
        Ok(data
            .expect_node::<ItemNode>("ProjectV2Item", item_id)?
            .into_record())
    }
}

/// Variables shared by both incident item queries.
fn item_variables() -> Value {
    json!({
        "labels": ITEM_LABEL_PAGE_SIZE,
        "status": FIELD_STATUS,
        "impactType": FIELD_IMPACT_TYPE,
        "beganAt": FIELD_BEGAN_AT,
        "endedAt": FIELD_ENDED_AT,
        "labelsField": FIELD_LABELS,
    })
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl<T> GraphQlResponse<T> {
    fn into_data(self) -> Result<T, SourceError> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            return Err(SourceError::GraphQl {
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }
        self.data.ok_or_else(|| {
            SourceError::Decode("response carried neither data nor errors".to_string())
        })
    }
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T> Connection<T> {
    fn into_nodes(self) -> impl Iterator<Item = T> {
        self.nodes.into_iter().flatten()
    }
}

#[derive(Debug, Deserialize)]
struct IdNode {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FindUserProjectData {
    user: Option<UserNode>,
}

#[derive(Debug, Deserialize)]
struct UserNode {
    #[serde(rename = "projectV2")]
    project: Option<ProjectRefNode>,
}

#[derive(Debug, Deserialize)]
struct ProjectRefNode {
    id: String,
    number: u64,
}

impl FindUserProjectData {
    fn into_project_ref(self, login: &str, number: u64) -> Result<ProjectRef, SourceError> {
        let user = self.user.ok_or_else(|| SourceError::NotFound {
            kind: "User",
            id: login.to_string(),
        })?;
        let project = user.project.ok_or_else(|| SourceError::NotFound {
            kind: "Project",
            id: format!("{}/{}", login, number),
        })?;
        Ok(ProjectRef {
            id: project.id,
            number: project.number,
        })
    }
}

/// `node(id:)` lookups: the node is `null` for unknown ids and carries only
/// `__typename` when it exists but has another type, so the typename is
/// checked before the node is decoded into its selection shape.
#[derive(Debug, Deserialize)]
struct NodeData {
    node: Option<Value>,
}

impl NodeData {
    fn expect_node<T: DeserializeOwned>(self, kind: &'static str, id: &str) -> Result<T, SourceError> {
        let node = self
            .node
            .filter(|node| node.get("__typename").and_then(Value::as_str) == Some(kind))
            .ok_or_else(|| SourceError::NotFound {
                kind,
                id: id.to_string(),
            })?;
        serde_json::from_value(node).map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum FieldNode {
    ProjectV2SingleSelectField {
        #[serde(default)]
        options: Vec<OptionNode>,
    },
    ProjectV2Field {
        #[serde(rename = "dataType")]
        data_type: String,
    },
    ProjectV2IterationField {
        #[serde(rename = "dataType")]
        data_type: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct OptionNode {
    name: String,
}

fn into_field_record(field: Option<FieldNode>) -> FieldRecord {
    match field {
        Some(FieldNode::ProjectV2SingleSelectField { options }) => FieldRecord::SingleSelect {
            options: options.into_iter().map(|o| o.name).collect(),
        },
        Some(FieldNode::ProjectV2Field { data_type })
        | Some(FieldNode::ProjectV2IterationField { data_type }) => {
            FieldRecord::Plain { data_type }
        }
        Some(FieldNode::Other) | None => FieldRecord::Missing,
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryNode<L> {
    #[serde(default = "Connection::default")]
    labels: Connection<L>,
}

#[derive(Debug, Deserialize)]
struct PlainLabelNode {
    id: String,
    name: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaProjectNode {
    #[serde(default)]
    repositories: Connection<RepositoryNode<PlainLabelNode>>,
    status: Option<FieldNode>,
    impact_type: Option<FieldNode>,
    began_at: Option<FieldNode>,
    ended_at: Option<FieldNode>,
}

impl SchemaProjectNode {
    fn into_schema(self) -> ProjectSchema {
        let labels = self
            .repositories
            .into_nodes()
            .flat_map(|repo| repo.labels.into_nodes())
            .map(|label| LabelRecord {
                id: label.id,
                name: label.name,
                description: label.description,
                linked_items: Vec::new(),
            })
            .collect();

        ProjectSchema {
            labels,
            status: into_field_record(self.status),
            impact_type: into_field_record(self.impact_type),
            began_at: into_field_record(self.began_at),
            ended_at: into_field_record(self.ended_at),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelNode {
    id: String,
    name: String,
    description: Option<String>,
    #[serde(default)]
    issues: Connection<LabelIssueNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelIssueNode {
    #[serde(default)]
    project_items: Connection<IdNode>,
}

impl LabelNode {
    fn into_record(self) -> LabelRecord {
        let linked_items = self
            .issues
            .into_nodes()
            .flat_map(|issue| issue.project_items.into_nodes())
            .map(|item| item.id)
            .collect();

        LabelRecord {
            id: self.id,
            name: self.name,
            description: self.description,
            linked_items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelsProjectNode {
    #[serde(default)]
    repositories: Connection<RepositoryNode<LabelNode>>,
}

impl LabelsProjectNode {
    fn into_labels(self) -> Vec<LabelRecord> {
        self.repositories
            .into_nodes()
            .flat_map(|repo| repo.labels.into_nodes())
            .map(LabelNode::into_record)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct FieldProjectNode {
    field: Option<FieldNode>,
}

#[derive(Debug, Deserialize)]
struct ItemsProjectNode {
    #[serde(default)]
    items: Connection<ItemNode>,
}

impl ItemsProjectNode {
    fn into_items(self) -> Vec<ItemRecord> {
        self.items.into_nodes().map(ItemNode::into_record).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemNode {
    id: String,
    content: Option<ContentNode>,
    phase: Option<ValueNode>,
    impact_type: Option<ValueNode>,
    began_at: Option<ValueNode>,
    ended_at: Option<ValueNode>,
    labels: Option<ValueNode>,
}

#[derive(Debug, Deserialize)]
struct ContentNode {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum ValueNode {
    ProjectV2ItemFieldSingleSelectValue {
        name: Option<String>,
    },
    ProjectV2ItemFieldTextValue {
        text: Option<String>,
    },
    ProjectV2ItemFieldLabelValue {
        #[serde(default)]
        labels: Connection<IdNode>,
    },
    #[serde(other)]
    Other,
}

impl ValueNode {
    fn into_value(value: Option<ValueNode>) -> FieldValue {
        match value {
            Some(ValueNode::ProjectV2ItemFieldSingleSelectValue { name: Some(name) }) => {
                FieldValue::SingleSelect(name)
            }
            Some(ValueNode::ProjectV2ItemFieldTextValue { text: Some(text) }) => {
                FieldValue::Text(text)
            }
            Some(ValueNode::ProjectV2ItemFieldLabelValue { labels }) => {
                FieldValue::Labels(labels.into_nodes().map(|label| label.id).collect())
            }
            _ => FieldValue::Empty,
        }
    }
}

impl ItemNode {
    fn into_record(self) -> ItemRecord {
        ItemRecord {
            id: self.id,
            title: self.content.and_then(|content| content.title),
            phase: ValueNode::into_value(self.phase),
            impact_type: ValueNode::into_value(self.impact_type),
            began_at: ValueNode::into_value(self.began_at),
            ended_at: ValueNode::into_value(self.ended_at),
            labels: ValueNode::into_value(self.labels),
        }
    }
}
