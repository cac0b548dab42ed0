use chrono::{DateTime, Utc};
use influxdb::{Client, InfluxDbWriteable, ReadQuery, Timestamp};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::config::{ConnectionSettings, Profile};
use crate::error::{FluxcError, Result};

/// Measurement written, read back and dropped by the self-test.
pub const SAMPLE_MEASUREMENT: &str = "test_meas";

/// Tag values for the two self-test rows of each insert round.
pub const SAMPLE_HOSTS: [&str; 2] = ["second_host", "first_host"];

/// Equality constraints on tag key/value pairs, applied at display time.
pub type TagFilter = BTreeMap<String, String>;

/// A single result row: column name to value, in column order.
pub type Point = serde_json::Map<String, JsonValue>;

/// A client handle bound to one server, database and credential set.
#[derive(Debug)]
pub struct DatabaseConnection {
    client: Client,
}

impl DatabaseConnection {
    /// Build a handle for the given connection settings and profile.
    ///
    /// Reachability is not checked here; the first query surfaces any
    /// transport problem.
    pub fn connect(settings: &ConnectionSettings, profile: &Profile) -> DatabaseConnection {
        let client =
            Client::new(base_url(settings), &settings.database).with_auth(&profile.name, &profile.pw);

        DatabaseConnection { client }
    }

    /// Execute one InfluxQL statement and parse the result set.
    pub async fn run_query(&self, statement: &str) -> Result<QueryResult> {
        let raw = self.client.query(ReadQuery::new(statement)).await?;
        QueryResult::from_json(&raw)
    }

    /// Write the self-test sample rows, one write call per row.
    pub async fn insert_sample_rows(&self) -> Result<()> {
        for query in sample_queries(Utc::now()) {
            self.client.query(query).await?;
        }
        Ok(())
    }
}

fn base_url(settings: &ConnectionSettings) -> String {
    let scheme = if settings.ssl { "https" } else { "http" };
    format!("{scheme}://{}:{}", settings.host, settings.port)
}

/// Join the CLI statement tokens into the single query string.
pub fn join_statement(tokens: &[String]) -> String {
    tokens.join(" ")
}

/// One sample row per entry of [`SAMPLE_HOSTS`], sharing the given wall-clock
/// timestamp at second precision; the `value` field carries the sub-second
/// microsecond component so repeated rounds stay distinguishable.
fn sample_queries(now: DateTime<Utc>) -> Vec<influxdb::WriteQuery> {
    let value = i64::from(now.timestamp_subsec_micros());
    SAMPLE_HOSTS
        .iter()
        .map(|host| {
            Timestamp::Seconds(now.timestamp() as u128)
                .into_query(SAMPLE_MEASUREMENT)
                .add_tag("host", *host)
                .add_field("value", value)
        })
        .collect()
}

/// Response body of the `/query` endpoint.
#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    results: Vec<RawStatement>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStatement {
    #[serde(default)]
    series: Vec<Series>,
    #[serde(default)]
    error: Option<String>,
}

/// One series of a statement result: a measurement name, the tag set the
/// server grouped by (if any), and rows as column-ordered JSON values.
#[derive(Debug, Clone, Deserialize)]
pub struct Series {
    pub name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<JsonValue>>,
}

/// Parsed result set of one statement, consumed immediately for display.
#[derive(Debug)]
pub struct QueryResult {
    series: Vec<Series>,
}

impl QueryResult {
    /// Parse the server's JSON body. A statement-level `error` entry means
    /// the server rejected the query even though the transport succeeded.
    pub(crate) fn from_json(raw: &str) -> Result<QueryResult> {
        let response: RawResponse =
            serde_json::from_str(raw).map_err(|err| FluxcError::QueryRejected {
                reason: format!("unexpected response body: {err}"),
            })?;

        if let Some(reason) = response.error {
            return Err(FluxcError::QueryRejected { reason });
        }

        let mut series = Vec::new();
        for statement in response.results {
            if let Some(reason) = statement.error {
                return Err(FluxcError::QueryRejected { reason });
            }
            series.extend(statement.series);
        }

        Ok(QueryResult { series })
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Rows across all series, restricted to those matching the tag filter.
    ///
    /// A row passes when every constraint matches the series' tag set, or
    /// every constraint matches the row's own column values (tags appear as
    /// plain columns when the query did not group by them).
    pub fn points(&self, tag_filter: &TagFilter) -> Vec<Point> {
        let mut points = Vec::new();
        for series in &self.series {
            for row in &series.values {
                let point: Point = series
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                if matches_filter(tag_filter, &series.tags, &point) {
                    points.push(point);
                }
            }
        }
        points
    }

    /// Render rows for display: an optional caption line, then each row as
    /// `  NN  {column mapping}` with the index zero-padded to width 2 and
    /// counted from 0 in result order.
    pub fn render(&self, tag_filter: &TagFilter, caption: Option<&str>) -> String {
        let mut out = String::new();
        if let Some(caption) = caption {
            out.push_str(caption);
            out.push('\n');
        }
        for (index, point) in self.points(tag_filter).into_iter().enumerate() {
            let _ = writeln!(out, "  {index:02}  {}", JsonValue::Object(point));
        }
        out
    }

    pub fn print(&self, tag_filter: &TagFilter, caption: Option<&str>) {
        print!("{}", self.render(tag_filter, caption));
    }
}

fn matches_filter(filter: &TagFilter, series_tags: &BTreeMap<String, String>, point: &Point) -> bool {
    if filter.is_empty() {
        return true;
    }
    let tags_match = filter
        .iter()
        .all(|(key, value)| series_tags.get(key) == Some(value));
    let columns_match = filter.iter().all(|(key, value)| {
        point.get(key).and_then(JsonValue::as_str) == Some(value.as_str())
    });
    tags_match || columns_match
}
