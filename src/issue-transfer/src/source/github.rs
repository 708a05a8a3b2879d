//! GitHub GraphQL implementation of [`RecordSource`].

use super::{RecordSource, SourceError};
use crate::client::{build_client, graphql_base};
use crate::config::RepositoryId;
use crate::records::{
    Author, Comment, Label, Milestone, Record, RecordKind, PULL_REQUEST_TITLE_PREFIX,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, info_span, Instrument};
use url::Url;

/// Nodes requested per page.
const PAGE_SIZE: u8 = 100;

/// Fields requested for issues and pull requests. Nested collections are
/// capped at their first page.
const RECORD_FIELDS: &str = "number title body createdAt updatedAt closedAt closed \
    milestone { number } \
    author { login avatarUrl(size: 100) } \
    assignees(first: 100) { nodes { login } } \
    labels(first: 100) { nodes { name } } \
    comments(first: 100) { nodes { author { login avatarUrl(size: 100) } body createdAt } }";

const LABEL_FIELDS: &str = "name color description";

const MILESTONE_FIELDS: &str = "number title description state dueOn";

const CREATED_ASC: &str = ", orderBy: { field: CREATED_AT, direction: ASC }";

/// Origin repository read through the GitHub GraphQL API.
pub struct GitHubSource {
    repository: RepositoryId,
    client: Octocrab,
}

impl GitHubSource {
    /// Builds a client for the given REST endpoint. Queries go to the
    /// matching GraphQL endpoint, `/api/graphql` on Enterprise hosts.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be used as a base URI.
    pub fn new(
        repository: RepositoryId,
        endpoint: &Url,
        token: Option<&str>,
    ) -> Result<Self, octocrab::Error> {
        Ok(Self {
            client: build_client(&graphql_base(endpoint), token, None)?,
            repository,
        })
    }

    /// Fetches every node of a repository connection, page by page.
    async fn paginate<T: DeserializeOwned>(
        &self,
        connection: &'static str,
        fields: &str,
        order: &str,
    ) -> Result<Vec<T>, SourceError> {
        let span = info_span!("fetch", repo = %self.repository, connection);

        async {
            let query = build_query(connection, fields, order);
            let mut cursor: Option<String> = None;
            let mut items = Vec::new();

            loop {
                let payload = json!({
                    "query": query,
                    "variables": {
                        "owner": self.repository.owner,
                        "repo": self.repository.name,
                        "cursor": cursor,
                    }
                });
                let data: Value = self
                    .client
                    .graphql(&payload)
                    .await
                    .map_err(|e| graphql_error(e, connection))?;
                let page: Connection<T> = extract_connection(data, connection, &self.repository)?;

                items.extend(page.nodes);
                debug!(fetched = items.len(), "Fetched page");

                match page.page_info.end_cursor {
                    Some(next) if page.page_info.has_next_page => cursor = Some(next),
                    _ => break,
                }
            }

            info!(count = items.len(), "Fetched all nodes");
            Ok(items)
        }
        .instrument(span)
        .await
    }
}

fn build_query(connection: &str, fields: &str, order: &str) -> String {
    format!(
        "query($owner: String!, $repo: String!, $cursor: String) {{ \
         repository(owner: $owner, name: $repo) {{ \
         {connection}(first: {PAGE_SIZE}, after: $cursor{order}) {{ \
         nodes {{ {fields} }} pageInfo {{ endCursor hasNextPage }} }} }} }}"
    )
}

/// Splits GraphQL-level failures out of the transport errors.
fn graphql_error(error: octocrab::Error, connection: &'static str) -> SourceError {
    match error {
        octocrab::Error::Graphql { source, .. } => SourceError::GraphQl {
            connection,
            messages: source
                .0
                .iter()
                .map(|error| error.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        },
        other => SourceError::GitHubError(other),
    }
}

/// Pulls `repository.<connection>` out of the `data` object of a response.
fn extract_connection<T: DeserializeOwned>(
    mut data: Value,
    connection: &'static str,
    repository: &RepositoryId,
) -> Result<Connection<T>, SourceError> {
    let repository_value = data
        .get_mut("repository")
        .map(Value::take)
        .filter(|value| !value.is_null())
        .ok_or_else(|| SourceError::MissingRepository {
            repository: repository.full_name(),
        })?;

    let connection_value = repository_value
        .get(connection)
        .cloned()
        .unwrap_or(Value::Null);

    serde_json::from_value(connection_value)
        .map_err(|source| SourceError::InvalidResponse { connection, source })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection<T> {
    nodes: Vec<T>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<T>,
}

impl<T> Default for Nodes<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActorNode {
    login: String,
    avatar_url: String,
}

impl From<ActorNode> for Author {
    fn from(node: ActorNode) -> Self {
        Self {
            login: node.login,
            avatar_url: node.avatar_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginNode {
    login: String,
}

#[derive(Debug, Deserialize)]
struct NameNode {
    name: String,
}

#[derive(Debug, Deserialize)]
struct NumberNode {
    number: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    author: Option<ActorNode>,
    body: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordNode {
    number: u64,
    title: String,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    closed: bool,
    milestone: Option<NumberNode>,
    author: Option<ActorNode>,
    #[serde(default)]
    assignees: Nodes<LoginNode>,
    #[serde(default)]
    labels: Option<Nodes<NameNode>>,
    #[serde(default)]
    comments: Nodes<CommentNode>,
}

impl RecordNode {
    fn into_record(self, kind: RecordKind) -> Record {
        let title = match kind {
            RecordKind::Issue => self.title,
            RecordKind::PullRequest => format!("{PULL_REQUEST_TITLE_PREFIX}{}", self.title),
        };

        Record {
            kind,
            number: self.number,
            title,
            body: self.body,
            created_at: self.created_at,
            updated_at: self.updated_at,
            closed_at: self.closed_at,
            closed: self.closed,
            labels: self
                .labels
                .unwrap_or_default()
                .nodes
                .into_iter()
                .map(|label| label.name)
                .collect(),
            milestone_number: self.milestone.map(|milestone| milestone.number),
            assignee_login: self
                .assignees
                .nodes
                .into_iter()
                .next()
                .map(|assignee| assignee.login),
            author: self.author.map_or_else(Author::ghost, Author::from),
            comments: self
                .comments
                .nodes
                .into_iter()
                .map(|comment| Comment {
                    author: comment.author.map_or_else(Author::ghost, Author::from),
                    body: comment.body,
                    created_at: comment.created_at,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelNode {
    name: String,
    color: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MilestoneNode {
    number: u64,
    title: String,
    description: Option<String>,
    state: String,
    due_on: Option<DateTime<Utc>>,
}

#[async_trait]
impl RecordSource for GitHubSource {
    async fn labels(&self) -> Result<Vec<Label>, SourceError> {
        let nodes: Vec<LabelNode> = self.paginate("labels", LABEL_FIELDS, CREATED_ASC).await?;
        Ok(nodes
            .into_iter()
            .map(|node| Label {
                name: node.name,
                color: node.color,
                description: node.description.unwrap_or_default(),
            })
            .collect())
    }

    async fn milestones(&self) -> Result<Vec<Milestone>, SourceError> {
        let nodes: Vec<MilestoneNode> = self
            .paginate("milestones", MILESTONE_FIELDS, CREATED_ASC)
            .await?;
        Ok(nodes
            .into_iter()
            .map(|node| Milestone {
                number: node.number,
                title: node.title,
                state: node.state,
                due_on: node.due_on,
                description: node.description.unwrap_or_default(),
            })
            .collect())
    }

    async fn issues(&self) -> Result<Vec<Record>, SourceError> {
        let nodes: Vec<RecordNode> = self.paginate("issues", RECORD_FIELDS, CREATED_ASC).await?;
        Ok(nodes
            .into_iter()
            .map(|node| node.into_record(RecordKind::Issue))
            .collect())
    }

    async fn pull_requests(&self) -> Result<Vec<Record>, SourceError> {
        let nodes: Vec<RecordNode> = self
            .paginate("pullRequests", RECORD_FIELDS, CREATED_ASC)
            .await?;
        Ok(nodes
            .into_iter()
            .map(|node| node.into_record(RecordKind::PullRequest))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repository() -> RepositoryId {
        RepositoryId::parse("octo/origin").unwrap()
    }

    fn source(server: &MockServer) -> GitHubSource {
        let endpoint = Url::parse(&server.uri()).unwrap();
        GitHubSource::new(repository(), &endpoint, Some("token")).unwrap()
    }

    fn pull_request_data() -> Value {
        json!({
            "repository": {
                "pullRequests": {
                    "nodes": [{
                        "number": 2,
                        "title": "Add feature",
                        "body": "Implements it",
                        "createdAt": "2020-01-01T00:00:00Z",
                        "updatedAt": "2020-01-02T00:00:00Z",
                        "closedAt": "2020-01-03T00:00:00Z",
                        "closed": true,
                        "milestone": { "number": 1 },
                        "author": { "login": "bob", "avatarUrl": "https://a/bob" },
                        "assignees": { "nodes": [{ "login": "alice" }, { "login": "carol" }] },
                        "labels": { "nodes": [{ "name": "feature" }] },
                        "comments": { "nodes": [{
                            "author": null,
                            "body": "LGTM",
                            "createdAt": "2020-01-02T12:00:00Z"
                        }] }
                    }],
                    "pageInfo": { "endCursor": "Y3Vyc29y", "hasNextPage": false }
                }
            }
        })
    }

    fn label_page(names: &[&str], end_cursor: Option<&str>) -> Value {
        let nodes: Vec<Value> = names
            .iter()
            .map(|name| json!({ "name": name, "color": "ededed", "description": null }))
            .collect();
        json!({
            "data": {
                "repository": {
                    "labels": {
                        "nodes": nodes,
                        "pageInfo": {
                            "endCursor": end_cursor,
                            "hasNextPage": end_cursor.is_some()
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn converts_pull_request_nodes() {
        let page: Connection<RecordNode> =
            extract_connection(pull_request_data(), "pullRequests", &repository()).unwrap();
        assert!(!page.page_info.has_next_page);

        let record = page
            .nodes
            .into_iter()
            .next()
            .unwrap()
            .into_record(RecordKind::PullRequest);

        assert_eq!(record.number, 2);
        assert_eq!(record.title, "[PR] Add feature");
        assert!(record.closed);
        assert_eq!(record.labels, vec!["feature"]);
        assert_eq!(record.milestone_number, Some(1));
        assert_eq!(record.assignee_login.as_deref(), Some("alice"));
        assert_eq!(record.author.login, "bob");
        assert_eq!(record.comments.len(), 1);
        assert_eq!(record.comments[0].author, Author::ghost());
    }

    #[test]
    fn null_repository_is_missing() {
        let data = json!({ "repository": null });

        let result: Result<Connection<LabelNode>, _> =
            extract_connection(data, "labels", &repository());
        assert!(matches!(result, Err(SourceError::MissingRepository { .. })));
    }

    #[test]
    fn query_names_connection_and_order() {
        let query = build_query("issues", "number", CREATED_ASC);
        assert!(query.contains(
            "issues(first: 100, after: $cursor, orderBy: { field: CREATED_AT, direction: ASC })"
        ));
        assert!(query.contains("pageInfo { endCursor hasNextPage }"));
    }

    #[tokio::test]
    async fn follows_cursor_across_pages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({ "variables": { "cursor": "page-2" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(label_page(&["docs"], None)))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({
                "variables": { "owner": "octo", "repo": "origin", "cursor": null }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(label_page(&["bug"], Some("page-2"))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let labels = source(&server).labels().await.unwrap();

        let names: Vec<_> = labels.iter().map(|label| label.name.as_str()).collect();
        assert_eq!(names, vec!["bug", "docs"]);
        assert_eq!(labels[0].color, "ededed");
        assert_eq!(labels[0].description, "");
    }

    #[tokio::test]
    async fn pull_requests_are_read_from_data_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": pull_request_data() })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let pulls = source(&server).pull_requests().await.unwrap();

        assert_eq!(pulls.len(), 1);
        assert_eq!(pulls[0].kind, RecordKind::PullRequest);
        assert_eq!(pulls[0].title, "[PR] Add feature");
    }

    #[tokio::test]
    async fn graphql_errors_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "repository": null },
                "errors": [{
                    "type": "NOT_FOUND",
                    "path": ["repository"],
                    "message": "Could not resolve to a Repository with the name 'octo/origin'."
                }]
            })))
            .mount(&server)
            .await;

        let result = source(&server).milestones().await;

        match result {
            Err(SourceError::GraphQl {
                connection,
                messages,
            }) => {
                assert_eq!(connection, "milestones");
                assert_eq!(
                    messages,
                    "Could not resolve to a Repository with the name 'octo/origin'."
                );
            }
            other => panic!("expected GraphQl error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn enterprise_endpoint_queries_api_graphql() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(label_page(&["bug"], None)))
            .expect(1)
            .mount(&server)
            .await;
        let endpoint = Url::parse(&format!("{}/api/v3", server.uri())).unwrap();
        let source = GitHubSource::new(repository(), &endpoint, None).unwrap();

        let labels = source.labels().await.unwrap();

        assert_eq!(labels.len(), 1);
    }

    #[tokio::test]
    async fn missing_repository_without_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "repository": null } })),
            )
            .mount(&server)
            .await;

        let result = source(&server).issues().await;

        assert!(matches!(result, Err(SourceError::MissingRepository { repository }) if repository == "octo/origin"));
    }
}
