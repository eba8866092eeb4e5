//! Asking a receiver for the custom names of its inputs.
//!
//! For each input we send `IRN<id>` and wait for the matching `IRN` reply.
//! Receivers push unrelated status messages at any time, so everything that
//! is not an IRN reply is skipped. Nothing here fails the caller: a silent,
//! confused or unreachable receiver just yields fewer (or no) names.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::eiscp::Connection;
use crate::eiscp::Connector;
use crate::eiscp::EiscpError;
use crate::eiscp::IRN;
use crate::eiscp::IRN_NAME;
use crate::eiscp::Request;
use crate::eiscp::with_connection;
use crate::inputs::CustomNames;
use crate::inputs::InputId;
use crate::inputs::MAX_NAME_LEN;

/// Timing for one query run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long to wait for the reply to each `IRN` request
    pub request_timeout: Duration,

    /// Pause between connecting and the first request
    pub settle_delay: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(300),
            settle_delay: Duration::from_secs(1),
        }
    }
}

/// Connect, query every input in `ids`, and disconnect.
///
/// Returns whatever names were collected. Connection failures are logged and
/// produce an empty map.
pub async fn query_custom_names<K: Connector>(
    connector: &K,
    ids: &[InputId],
    options: &QueryOptions,
) -> CustomNames {
    let result = with_connection(connector, async |conn| {
        if !options.settle_delay.is_zero() {
            tokio::time::sleep(options.settle_delay).await;
        }
        query_names_on(conn, ids, options).await
    })
    .await;

    match result {
        Ok(names) => names,
        Err(e) => {
            warn!(
                "Failed to query custom input names from {}: {}",
                connector.describe(),
                e
            );
            CustomNames::new()
        }
    }
}

/// Query `ids` one at a time over an already open connection.
pub async fn query_names_on<C: Connection>(
    conn: &mut C,
    ids: &[InputId],
    options: &QueryOptions,
) -> CustomNames {
    let mut names = CustomNames::new();

    for &id in ids {
        debug!("Querying custom name for input {}", id);

        if let Err(e) = conn.send(&Request::new(IRN, id.as_str())).await {
            if e.is_fatal() {
                warn!("Connection lost while querying input names: {}", e);
                break;
            }
            debug!("IRN send failed for {}: {}", id, e);
            continue;
        }

        match await_reply(conn, id, ids, &mut names, options.request_timeout).await {
            Ok(()) => {}
            Err(Wait::TimedOut) => {
                debug!(
                    "No IRN reply for input {} within {:?}",
                    id, options.request_timeout
                );
            }
            Err(Wait::Lost(e)) => {
                warn!("Connection lost while querying input names: {}", e);
                break;
            }
        }
    }

    info!("Found {} custom input names", names.len());
    names
}

enum Wait {
    TimedOut,
    Lost(EiscpError),
}

/// Read messages until the IRN reply for `id` arrives or the timeout runs out.
///
/// Replies for other queried inputs that turn up in the meantime are recorded
/// too.
async fn await_reply<C: Connection>(
    conn: &mut C,
    id: InputId,
    queried: &[InputId],
    names: &mut CustomNames,
    timeout: Duration,
) -> Result<(), Wait> {
    let deadline = Instant::now() + timeout;

    loop {
        let msg = match tokio::time::timeout_at(deadline, conn.recv()).await {
            Err(_) => return Err(Wait::TimedOut),
            Ok(Ok(Some(msg))) => msg,
            Ok(Ok(None)) => return Err(Wait::Lost(EiscpError::Closed)),
            Ok(Err(e)) if e.is_fatal() => return Err(Wait::Lost(e)),
            Ok(Err(e)) => {
                debug!("Dropping message: {}", e);
                continue;
            }
        };

        if msg.command != IRN_NAME {
            debug!(
                "Ignoring {} {} {:?} while waiting for input names",
                msg.zone, msg.command, msg.value
            );
            continue;
        }

        // Receivers answer `N/A` to an IRN query they cannot serve.
        let Some((reply_id, name)) = parse_irn_value(&msg.value) else {
            debug!("No usable IRN reply for input {}: {:?}", id, msg.value);
            return Ok(());
        };

        if !queried.contains(&reply_id) {
            debug!("Unknown input ID received: {}", reply_id);
            continue;
        }

        match name {
            Some(name) => {
                debug!("Found custom name for input {}: {}", reply_id, name);
                names.insert(reply_id, name);
            }
            None => debug!("Input {} has no custom name", reply_id),
        }

        if reply_id == id {
            return Ok(());
        }
    }
}

/// Split an IRN reply value (`"iixxxxxxxxxx"`) into the input id and the
/// custom name.
///
/// Returns `None` when the value does not start with an input id. The name is
/// `None` when nothing but whitespace follows the id.
pub fn parse_irn_value(value: &str) -> Option<(InputId, Option<String>)> {
    let (id, rest) = InputId::split_prefix(value)?;

    let trimmed = rest.trim();
    if trimmed.is_empty() {
        return Some((id, None));
    }

    let name: String = trimmed.chars().take(MAX_NAME_LEN).collect();
    Some((id, Some(name.trim_end().to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eiscp::mock::MockConnector;
    use crate::eiscp::mock::MockReply;

    fn id(code: &str) -> InputId {
        InputId::new(code).unwrap()
    }

    fn fast() -> QueryOptions {
        QueryOptions {
            request_timeout: Duration::from_millis(20),
            settle_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_parse_irn_value() {
        assert_eq!(
            parse_irn_value("00Apple TV"),
            Some((id("00"), Some("Apple TV".to_string())))
        );
        assert_eq!(
            parse_irn_value("23  Cable Box  "),
            Some((id("23"), Some("Cable Box".to_string())))
        );
        assert_eq!(parse_irn_value("00"), Some((id("00"), None)));
        assert_eq!(parse_irn_value("01     "), Some((id("01"), None)));
        assert_eq!(parse_irn_value(""), None);
        assert_eq!(parse_irn_value("0"), None);
        assert_eq!(parse_irn_value("N/A"), None);
    }

    #[test]
    fn test_parse_irn_value_truncates_long_names() {
        assert_eq!(
            parse_irn_value("10Living Room Blu-ray"),
            Some((id("10"), Some("Living Roo".to_string())))
        );
        assert_eq!(
            parse_irn_value("10Home Cinema"),
            Some((id("10"), Some("Home Cinem".to_string())))
        );
        assert_eq!(
            parse_irn_value("10Blu-ray    x"),
            Some((id("10"), Some("Blu-ray".to_string())))
        );
    }

    #[tokio::test]
    async fn test_query_collects_names() {
        let connector = MockConnector::new()
            .reply("IRN00", vec![MockReply::irn("00Apple TV")])
            .reply("IRN01", vec![MockReply::irn("01")])
            .reply("IRN23", vec![MockReply::irn("23Cable Box")]);

        let names =
            query_custom_names(&connector, &[id("00"), id("01"), id("23")], &fast()).await;

        assert_eq!(names.len(), 2);
        assert_eq!(names.get(&id("00")).map(String::as_str), Some("Apple TV"));
        assert_eq!(names.get(&id("23")).map(String::as_str), Some("Cable Box"));
        assert!(!names.contains_key(&id("01")));

        let log = connector.log.lock().unwrap();
        assert_eq!(log.sent, vec!["IRN00", "IRN01", "IRN23"]);
        assert_eq!(log.closed, 1);
    }

    #[tokio::test]
    async fn test_query_skips_silent_inputs() {
        let connector = MockConnector::new().reply("IRN02", vec![MockReply::irn("02Switch")]);

        let names = query_custom_names(&connector, &[id("00"), id("01"), id("02")], &fast()).await;

        assert_eq!(names.len(), 1);
        assert_eq!(names.get(&id("02")).map(String::as_str), Some("Switch"));
        assert_eq!(connector.log.lock().unwrap().sent.len(), 3);
    }

    #[tokio::test]
    async fn test_query_ignores_unsolicited_and_malformed_messages() {
        let connector = MockConnector::new().reply(
            "IRN00",
            vec![
                MockReply::other("PWR", "01"),
                MockReply::Malformed,
                MockReply::other("MVL", "2A"),
                MockReply::irn("00Apple TV"),
            ],
        );

        let names = query_custom_names(&connector, &[id("00")], &fast()).await;

        assert_eq!(names.get(&id("00")).map(String::as_str), Some("Apple TV"));
    }

    #[tokio::test]
    async fn test_unsupported_reply_ends_wait_without_timeout() {
        let connector = MockConnector::new()
            .reply("IRN00", vec![MockReply::irn("N/A")])
            .reply("IRN01", vec![MockReply::irn("01Roku")]);
        let options = QueryOptions {
            request_timeout: Duration::from_secs(30),
            settle_delay: Duration::ZERO,
        };

        let names = tokio::time::timeout(
            Duration::from_secs(5),
            query_custom_names(&connector, &[id("00"), id("01")], &options),
        )
        .await
        .expect("N/A reply should not wait for the request timeout");

        assert_eq!(names.len(), 1);
        assert_eq!(names.get(&id("01")).map(String::as_str), Some("Roku"));
    }

    #[tokio::test]
    async fn test_query_records_late_reply_for_other_input() {
        // The reply for 00 only shows up after we have moved on to 01.
        let connector = MockConnector::new().reply(
            "IRN01",
            vec![MockReply::irn("00Apple TV"), MockReply::irn("01Roku")],
        );

        let names = query_custom_names(&connector, &[id("00"), id("01")], &fast()).await;

        assert_eq!(names.get(&id("00")).map(String::as_str), Some("Apple TV"));
        assert_eq!(names.get(&id("01")).map(String::as_str), Some("Roku"));
    }

    #[tokio::test]
    async fn test_query_drops_replies_for_unqueried_inputs() {
        let connector = MockConnector::new().reply(
            "IRN00",
            vec![MockReply::irn("55Projector"), MockReply::irn("00Apple TV")],
        );

        let names = query_custom_names(&connector, &[id("00")], &fast()).await;

        assert_eq!(names.len(), 1);
        assert!(!names.contains_key(&id("55")));
    }

    #[tokio::test]
    async fn test_query_stops_when_receiver_hangs_up() {
        let connector = MockConnector::new()
            .reply("IRN00", vec![MockReply::irn("00Apple TV")])
            .reply("IRN01", vec![MockReply::Hangup]);

        let names =
            query_custom_names(&connector, &[id("00"), id("01"), id("02")], &fast()).await;

        assert_eq!(names.len(), 1);
        let log = connector.log.lock().unwrap();
        assert_eq!(log.sent, vec!["IRN00", "IRN01"]);
        assert_eq!(log.closed, 1);
    }

    #[tokio::test]
    async fn test_failed_connection_yields_empty_map() {
        let connector = MockConnector::failing();

        let names = query_custom_names(&connector, &[id("00"), id("01")], &fast()).await;

        assert!(names.is_empty());
        assert_eq!(connector.log.lock().unwrap().connects, 1);
    }

    #[tokio::test]
    async fn test_query_with_no_ids() {
        let connector = MockConnector::new();

        let names = query_custom_names(&connector, &[], &fast()).await;

        assert!(names.is_empty());
        assert_eq!(connector.log.lock().unwrap().closed, 1);
    }
}
