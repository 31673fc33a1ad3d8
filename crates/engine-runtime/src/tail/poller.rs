//! The poll loop: build the next query from the watermark, run it, print
//! the rows, advance the watermark, sleep, repeat.
//!
//! Cycles are strictly sequential. The only state carried from one cycle to
//! the next is the watermark.

use crate::{
    error::TailError,
    render::{BatchRenderer, renderer_for},
};
use connectors::sql::base::source::TailSource;
use model::{
    execution::poll::PollConfig,
    pagination::watermark::{TailPhase, Watermark},
};
use planner::query::tail::{TailQueryBuilder, TailQueryKind};
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// What one poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub kind: TailQueryKind,
    pub rows: usize,
    pub advanced: bool,
}

pub struct TailPoller<S, W> {
    source: S,
    config: PollConfig,
    renderer: Box<dyn BatchRenderer>,
    watermark: Watermark,
    out: W,
}

impl<S, W> TailPoller<S, W>
where
    S: TailSource,
    W: Write + Send,
{
    pub fn new(source: S, config: PollConfig, out: W) -> Self {
        let renderer = renderer_for(&config);
        Self {
            source,
            config,
            renderer,
            watermark: Watermark::new(),
            out,
        }
    }

    pub fn watermark(&self) -> &Watermark {
        &self.watermark
    }

    pub fn phase(&self) -> TailPhase {
        self.watermark.phase()
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Runs a single cycle without the trailing sleep.
    pub async fn poll_once(&mut self) -> Result<PollOutcome, TailError> {
        let query =
            TailQueryBuilder::new(&self.config, self.source.dialect()).build(&self.watermark);
        let batch = self.source.fetch(&query).await?;

        // The header goes out once, with the first rows ever printed.
        let with_header = self.watermark.phase() == TailPhase::Priming;
        let rows = self.renderer.render(&batch, with_header, &mut self.out)?;

        let key_index = batch.field_index(self.config.key().as_str()).unwrap_or(0);
        let advanced = self.watermark.advance(&batch, key_index);

        debug!(
            kind = ?query.kind,
            rows,
            watermark = ?self.watermark.current(),
            "Poll complete"
        );

        Ok(PollOutcome {
            kind: query.kind,
            rows,
            advanced,
        })
    }

    /// Polls until `cancel` fires or a poll fails. Cancellation is checked
    /// before each poll, while the query is in flight, and while sleeping.
    /// A cancelled query is dropped before any of its rows are printed.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), TailError> {
        info!(
            table = %self.config.table(),
            key = %self.config.key(),
            interval_secs = self.config.interval().as_secs(),
            "Tailing table"
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = self.poll_once() => {
                    outcome?;
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval()) => {}
            }
        }

        info!(
            watermark = ?self.watermark.current(),
            "Cancellation requested. Stopping tail."
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use connectors::sql::base::error::DbError;
    use model::{
        core::{identifiers::Identifier, value::Value},
        execution::poll::OutputMode,
        records::{batch::ResultBatch, row::Row},
    };
    use planner::query::{
        dialect::{Dialect, Postgres},
        tail::{STRUCTURED_FIELD, TailQuery},
    };
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };
    use tracing_test::traced_test;

    #[derive(Default)]
    struct FakeState {
        rows: Vec<(i64, String)>,
        queries: Vec<TailQuery>,
        failure: Option<String>,
        cancel_after: Option<(usize, CancellationToken)>,
        stall_from: Option<usize>,
    }

    /// In-memory table keyed by an integer, answering the two tail queries
    /// the way Postgres would.
    #[derive(Clone, Default)]
    struct FakeTable {
        state: Arc<Mutex<FakeState>>,
    }

    impl FakeTable {
        fn with_keys(keys: impl IntoIterator<Item = i64>) -> Self {
            let table = FakeTable::default();
            table.insert(keys);
            table
        }

        fn insert(&self, keys: impl IntoIterator<Item = i64>) {
            let mut state = self.state.lock().unwrap();
            state.rows.extend(keys.into_iter().map(|k| (k, format!("m{k}"))));
        }

        fn fail_with(&self, message: &str) {
            self.state.lock().unwrap().failure = Some(message.to_string());
        }

        fn cancel_after(&self, polls: usize, token: CancellationToken) {
            self.state.lock().unwrap().cancel_after = Some((polls, token));
        }

        /// The `polls`-th query and every later one never return.
        fn stall_from(&self, polls: usize) {
            self.state.lock().unwrap().stall_from = Some(polls);
        }

        fn queries(&self) -> Vec<TailQuery> {
            self.state.lock().unwrap().queries.clone()
        }
    }

    #[async_trait]
    impl TailSource for FakeTable {
        fn dialect(&self) -> &dyn Dialect {
            &Postgres
        }

        async fn fetch(&self, query: &TailQuery) -> Result<ResultBatch, DbError> {
            let stalled = {
                let mut state = self.state.lock().unwrap();
                state.queries.push(query.clone());

                if let Some((polls, token)) = &state.cancel_after {
                    if state.queries.len() >= *polls {
                        token.cancel();
                    }
                }
                state.stall_from.is_some_and(|n| state.queries.len() >= n)
            };
            if stalled {
                std::future::pending::<()>().await;
            }

            let state = self.state.lock().unwrap();
            if let Some(message) = &state.failure {
                return Err(DbError::Query(message.clone()));
            }

            let mut rows = state.rows.clone();
            rows.sort_by_key(|(k, _)| *k);
            let selected: Vec<(i64, String)> = match query.kind {
                TailQueryKind::Snapshot => {
                    let limit = query.params[0].as_i64().unwrap() as usize;
                    let skip = rows.len().saturating_sub(limit);
                    rows.into_iter().skip(skip).collect()
                }
                TailQueryKind::Incremental => {
                    let after: i64 = query.params[0].as_untyped().unwrap().parse().unwrap();
                    rows.into_iter().filter(|(k, _)| *k > after).collect()
                }
            };

            let structured = query.sql.contains(STRUCTURED_FIELD);
            let mut fields = vec!["id".to_string(), "msg".to_string()];
            if structured {
                fields.push(STRUCTURED_FIELD.to_string());
            }

            let rows = selected
                .into_iter()
                .map(|(k, msg)| {
                    let mut cells = vec![Some(k.to_string()), Some(msg.clone())];
                    if structured {
                        let object = serde_json::json!({ "id": k, "msg": msg });
                        cells.push(Some(object.to_string()));
                    }
                    Row::new(cells)
                })
                .collect();

            Ok(ResultBatch::new(fields, rows))
        }
    }

    fn config(mode: OutputMode) -> PollConfig {
        PollConfig::new(
            "events".parse().unwrap(),
            vec![Identifier::parse("id").unwrap(), Identifier::parse("msg").unwrap()],
            mode,
        )
        .unwrap()
        .with_snapshot_size(5)
        .with_interval(Duration::ZERO)
    }

    fn text(out: &[u8]) -> String {
        String::from_utf8(out.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_snapshot_then_only_new_rows() {
        let table = FakeTable::with_keys(1..=20);
        let mut poller = TailPoller::new(
            table.clone(),
            config(OutputMode::AlignedText).with_separator(","),
            Vec::<u8>::new(),
        );

        let first = poller.poll_once().await.unwrap();
        assert_eq!(first.kind, TailQueryKind::Snapshot);
        assert_eq!(first.rows, 5);
        assert_eq!(
            text(poller.output()),
            "id,msg\n16,m16\n17,m17\n18,m18\n19,m19\n20,m20\n"
        );
        assert_eq!(poller.watermark().current(), Some("20"));

        table.insert(21..=23);
        let second = poller.poll_once().await.unwrap();
        assert_eq!(second.kind, TailQueryKind::Incremental);
        assert_eq!(second.rows, 3);
        assert!(
            text(poller.output()).ends_with("20,m20\n21,m21\n22,m22\n23,m23\n"),
            "no header and no repeats after the snapshot"
        );
        assert_eq!(poller.watermark().current(), Some("23"));

        let queries = table.queries();
        assert_eq!(queries[1].params, vec![Value::Untyped("20".into())]);
    }

    #[tokio::test]
    async fn test_empty_polls_change_nothing() {
        let table = FakeTable::default();
        let mut poller = TailPoller::new(
            table.clone(),
            config(OutputMode::AlignedText),
            Vec::<u8>::new(),
        );

        let outcome = poller.poll_once().await.unwrap();
        assert_eq!(outcome.rows, 0);
        assert!(!outcome.advanced);
        assert_eq!(poller.phase(), TailPhase::Priming);
        assert!(poller.output().is_empty());

        // Still priming, so the next poll is another snapshot and carries the header.
        table.insert(1..=3);
        let outcome = poller.poll_once().await.unwrap();
        assert_eq!(outcome.kind, TailQueryKind::Snapshot);
        assert_eq!(text(poller.output()), "id | msg\n1  | m1 \n2  | m2 \n3  | m3 \n");

        let before = text(poller.output());
        let outcome = poller.poll_once().await.unwrap();
        assert_eq!(outcome.kind, TailQueryKind::Incremental);
        assert_eq!(outcome.rows, 0);
        assert!(!outcome.advanced);
        assert_eq!(poller.watermark().current(), Some("3"));
        assert_eq!(text(poller.output()), before);
    }

    #[tokio::test]
    async fn test_watermark_only_moves_forward_and_rows_print_once() {
        let table = FakeTable::with_keys(1..=2);
        let mut poller = TailPoller::new(
            table.clone(),
            config(OutputMode::AlignedText).with_separator("\t"),
            Vec::<u8>::new(),
        );

        let mut last: Option<i64> = None;
        let mut next = 3;
        for inserted in [0, 4, 1, 0, 7, 2] {
            table.insert(next..next + inserted);
            next += inserted;

            poller.poll_once().await.unwrap();
            let current: i64 = poller.watermark().current().unwrap().parse().unwrap();
            if let Some(prev) = last {
                assert!(current >= prev);
                assert_eq!(current > prev, inserted > 0);
            }
            last = Some(current);
        }

        let out = text(poller.output());
        let keys: Vec<i64> = out
            .lines()
            .skip(1)
            .map(|line| line.split('\t').next().unwrap().parse().unwrap())
            .collect();
        let expected: Vec<i64> = (1..next).collect();
        assert_eq!(keys, expected);
    }

    #[tokio::test]
    async fn test_structured_mode_has_no_header_and_one_object_per_line() {
        let table = FakeTable::with_keys(1..=3);
        let mut poller = TailPoller::new(
            table.clone(),
            config(OutputMode::StructuredPerRow),
            Vec::<u8>::new(),
        );

        poller.poll_once().await.unwrap();
        table.insert(4..=4);
        poller.poll_once().await.unwrap();

        let out = text(poller.output());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);

        for (i, line) in lines.iter().enumerate() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            let object = value.as_object().unwrap();
            let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
            keys.sort();
            assert_eq!(keys, vec!["id", "msg"]);
            assert_eq!(object["id"], serde_json::json!(i as i64 + 1));
        }
        assert_eq!(poller.watermark().current(), Some("4"));
    }

    #[tokio::test]
    async fn test_query_failure_is_reported_and_keeps_state() {
        let table = FakeTable::with_keys(1..=3);
        let mut poller = TailPoller::new(
            table.clone(),
            config(OutputMode::AlignedText),
            Vec::<u8>::new(),
        );
        poller.poll_once().await.unwrap();

        table.fail_with("ERROR:  column \"nope\" does not exist");
        let err = poller.poll_once().await.unwrap_err();

        assert!(matches!(err, TailError::Database(DbError::Query(_))));
        assert_eq!(err.to_string(), "ERROR:  column \"nope\" does not exist");
        assert_eq!(poller.watermark().current(), Some("3"));
    }

    #[traced_test]
    #[tokio::test]
    async fn test_run_stops_when_cancelled() {
        let table = FakeTable::with_keys(1..=3);
        let cancel = CancellationToken::new();
        table.cancel_after(3, cancel.clone());

        let mut poller = TailPoller::new(
            table.clone(),
            config(OutputMode::AlignedText),
            Vec::<u8>::new(),
        );
        poller.run(cancel).await.unwrap();

        assert_eq!(table.queries().len(), 3);
        assert!(logs_contain("Cancellation requested"));
    }

    #[traced_test]
    #[tokio::test]
    async fn test_run_stops_while_a_query_is_stalled() {
        let table = FakeTable::with_keys(1..=3);
        table.stall_from(2);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let mut poller = TailPoller::new(
            table.clone(),
            config(OutputMode::AlignedText),
            Vec::<u8>::new(),
        );
        tokio::time::timeout(Duration::from_secs(5), poller.run(cancel))
            .await
            .expect("run returns once cancelled")
            .unwrap();

        assert_eq!(table.queries().len(), 2);
        assert_eq!(poller.watermark().current(), Some("3"));
        assert_eq!(text(poller.output()), "id | msg\n1  | m1 \n2  | m2 \n3  | m3 \n");
        assert!(logs_contain("Cancellation requested"));
    }

    #[tokio::test]
    async fn test_run_does_not_poll_when_already_cancelled() {
        let table = FakeTable::with_keys(1..=3);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut poller = TailPoller::new(
            table.clone(),
            config(OutputMode::AlignedText),
            Vec::<u8>::new(),
        );
        poller.run(cancel).await.unwrap();

        assert!(table.queries().is_empty());
    }

    #[tokio::test]
    async fn test_run_ends_on_first_failure() {
        let table = FakeTable::with_keys(1..=3);
        table.fail_with("ERROR:  permission denied for table events");

        let mut poller = TailPoller::new(
            table.clone(),
            config(OutputMode::AlignedText),
            Vec::<u8>::new(),
        );
        let err = poller.run(CancellationToken::new()).await.unwrap_err();

        assert!(err.to_string().contains("permission denied"));
        assert_eq!(table.queries().len(), 1);
    }
}
