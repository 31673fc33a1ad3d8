use connectors::sql::postgres::adapter::PgAdapter;
use std::ops::RangeInclusive;

/// Drops and recreates a table so each test starts from its own empty copy.
pub async fn recreate_table(adapter: &PgAdapter, name: &str, columns: &str) {
    execute(
        adapter,
        &format!("DROP TABLE IF EXISTS {name}; CREATE TABLE {name} ({columns});"),
    )
    .await;
}

pub async fn execute(adapter: &PgAdapter, sql: &str) {
    adapter
        .client()
        .batch_execute(sql)
        .await
        .unwrap_or_else(|err| panic!("failed to execute {sql}: {err}"));
}

/// Inserts `msg-<n>` rows for every n in the range, keyed by n.
pub async fn insert_messages(adapter: &PgAdapter, table: &str, keys: RangeInclusive<i64>) {
    let (first, last) = keys.into_inner();
    execute(
        adapter,
        &format!(
            "INSERT INTO {table} (id, msg) \
             SELECT n, 'msg-' || n FROM generate_series({first}, {last}) AS n;"
        ),
    )
    .await;
}

pub fn output_lines(out: &[u8]) -> Vec<String> {
    String::from_utf8(out.to_vec())
        .expect("utf-8 output")
        .lines()
        .map(str::to_string)
        .collect()
}
