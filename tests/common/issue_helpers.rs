//! Helpers for observing reported issues

use super::test_timeout;
use crossbeam_channel::Receiver;
use listpipe::{ChannelSink, Issue, IssueRecord, Reporter};
use std::sync::Arc;

/// Reporter whose issues can be read back from the returned receiver
pub fn recording_reporter() -> (Reporter, Receiver<IssueRecord>) {
    let (sink, rx) = ChannelSink::bounded(1 << 16);
    (Reporter::new().with_sink(Arc::new(sink)), rx)
}

/// Block until an issue matching `pred` is reported; panics after the test timeout
pub fn wait_for_issue(issues: &Receiver<IssueRecord>, pred: impl Fn(&Issue) -> bool) -> Issue {
    loop {
        match issues.recv_timeout(test_timeout()) {
            Ok(record) if pred(&record.issue) => return record.issue,
            Ok(_) => {}
            Err(_) => panic!("expected issue was not reported in time"),
        }
    }
}

/// Whether `issue` is a per-list detail line from `module` starting with `prefix`
pub fn is_detail(issue: &Issue, module: &str, prefix: &str) -> bool {
    matches!(issue, Issue::Detail { module: m, message } if m == module && message.starts_with(prefix))
}
