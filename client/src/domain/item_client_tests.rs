//! Tests for the item client and its patch reconciliation.

use std::sync::Arc;

use async_trait::async_trait;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;

use super::*;
use crate::domain::ports::MockItemTransport;
use crate::domain::{ItemField, ItemUpdate};
use crate::test_support::sample_item;

/// Transport whose calls never complete.
struct StalledTransport;

#[async_trait]
impl ItemTransport for StalledTransport {
    async fn fetch_all(&self) -> Result<TransportReply<Vec<Item>>, TransportError> {
        std::future::pending().await
    }

    async fn fetch_one(&self, _id: &ItemId) -> Result<TransportReply<Item>, TransportError> {
        std::future::pending().await
    }

    async fn create(&self, _item: &NewItem) -> Result<TransportReply<Item>, TransportError> {
        std::future::pending().await
    }

    async fn replace(
        &self,
        _id: &ItemId,
        _update: &ItemUpdate,
    ) -> Result<TransportReply<()>, TransportError> {
        std::future::pending().await
    }

    async fn apply_patch(
        &self,
        _id: &ItemId,
        _patch: &PatchDocument,
    ) -> Result<TransportReply<Item>, TransportError> {
        std::future::pending().await
    }

    async fn delete(&self, _id: &ItemId) -> Result<TransportReply<()>, TransportError> {
        std::future::pending().await
    }
}

#[fixture]
fn original() -> Item {
    sample_item("A", 10)
}

#[fixture]
fn renamed() -> Item {
    sample_item("B", 10)
}

fn client(transport: MockItemTransport) -> ItemClient {
    ItemClient::new(Arc::new(transport))
}

#[rstest]
#[tokio::test]
async fn identical_snapshots_short_circuit_without_transport(original: Item) {
    let mut transport = MockItemTransport::new();
    transport.expect_apply_patch().never();

    let report = client(transport)
        .patch_item_with_report(&original, &original.clone(), &CancellationToken::new())
        .await;

    assert_eq!(report.resolution, PatchResolution::ShortCircuit);
    assert!(report.operations.is_empty());
    assert_eq!(report.outcome.status(), ProtocolStatus::UNUSED);
    assert_eq!(report.outcome.value(), &original);
}

#[rstest]
#[tokio::test]
async fn accepted_patch_without_body_returns_local_copy(original: Item, renamed: Item) {
    let mut transport = MockItemTransport::new();
    transport
        .expect_apply_patch()
        .withf(|id, patch| {
            id.as_uuid() == &crate::test_support::SAMPLE_ITEM_ID
                && patch.fields() == vec![ItemField::Name]
        })
        .times(1)
        .return_once(|_, _| Ok(TransportReply::empty(ProtocolStatus::NO_CONTENT)));

    let report = client(transport)
        .patch_item_with_report(&original, &renamed, &CancellationToken::new())
        .await;

    assert_eq!(report.resolution, PatchResolution::LocalFallback);
    assert_eq!(report.outcome.status(), ProtocolStatus::NO_CONTENT);
    let item = report.outcome.into_value();
    assert_eq!(item.name(), "B");
    assert_eq!(item.price(), Decimal::from(10));
    assert_eq!(item.id(), original.id());
}

#[rstest]
#[tokio::test]
async fn decoded_reply_body_wins_over_local_copy(original: Item, renamed: Item) {
    let server_copy = sample_item("B (normalised)", 11);
    let reply_copy = server_copy.clone();
    let mut transport = MockItemTransport::new();
    transport
        .expect_apply_patch()
        .times(1)
        .return_once(move |_, _| Ok(TransportReply::decoded(ProtocolStatus::OK, reply_copy)));

    let report = client(transport)
        .patch_item_with_report(&original, &renamed, &CancellationToken::new())
        .await;

    assert_eq!(report.resolution, PatchResolution::ServerBody);
    assert_eq!(report.outcome.status(), ProtocolStatus::OK);
    assert_eq!(report.outcome.value(), &server_copy);
}

#[rstest]
#[tokio::test]
async fn undecodable_reply_body_degrades_to_local_copy(original: Item, renamed: Item) {
    let mut transport = MockItemTransport::new();
    transport.expect_apply_patch().times(1).return_once(|_, _| {
        Ok(TransportReply::undecodable(
            ProtocolStatus::OK,
            "expected value at line 1 column 1",
        ))
    });

    let report = client(transport)
        .patch_item_with_report(&original, &renamed, &CancellationToken::new())
        .await;

    assert_eq!(report.resolution, PatchResolution::DegradedFallback);
    assert!(report.outcome.is_success());
    assert_eq!(report.outcome.value(), &renamed);
}

#[rstest]
#[tokio::test]
async fn reply_for_another_item_degrades_to_local_copy(original: Item, renamed: Item) {
    let stranger = Item::new(
        ItemId::random(),
        "C",
        "",
        Decimal::from(3),
        original.created_date(),
    )
    .expect("valid item");
    let mut transport = MockItemTransport::new();
    transport
        .expect_apply_patch()
        .return_once(move |_, _| Ok(TransportReply::decoded(ProtocolStatus::OK, stranger)));

    let report = client(transport)
        .patch_item_with_report(&original, &renamed, &CancellationToken::new())
        .await;

    assert_eq!(report.resolution, PatchResolution::DegradedFallback);
    assert_eq!(report.outcome.value(), &renamed);
}

#[rstest]
#[tokio::test]
async fn rejected_patch_fails_with_service_status(original: Item, renamed: Item) {
    let mut transport = MockItemTransport::new();
    transport
        .expect_apply_patch()
        .return_once(|_, _| Ok(TransportReply::empty(ProtocolStatus::NOT_FOUND)));

    let report = client(transport)
        .patch_item_with_report(&original, &renamed, &CancellationToken::new())
        .await;

    assert_eq!(report.resolution, PatchResolution::Failed);
    assert_eq!(report.outcome.status(), ProtocolStatus::NOT_FOUND);
    assert_eq!(
        report.outcome.failure_message(),
        format!("Error patching Item \"B\" at items/{}", original.id())
    );
    assert_eq!(report.operations.len(), 1);
}

#[rstest]
#[case::connection_with_status(TransportError::connection("bad gateway", 502_u16), ProtocolStatus::from_u16(502).ok())]
#[case::connection_without_status(TransportError::connection("refused", None), None)]
#[case::connection_with_non_error_status(TransportError::connection("body read failed", 200_u16), None)]
#[case::timeout(TransportError::timeout("10s elapsed"), None)]
#[tokio::test]
async fn transport_faults_become_failures(
    original: Item,
    renamed: Item,
    #[case] fault: TransportError,
    #[case] expected_status: Option<ProtocolStatus>,
) {
    let fault_text = fault.to_string();
    let mut transport = MockItemTransport::new();
    transport
        .expect_apply_patch()
        .return_once(move |_, _| Err(fault));

    let outcome = client(transport)
        .patch_item(&original, &renamed, &CancellationToken::new())
        .await;

    assert!(outcome.is_failure());
    assert_eq!(
        outcome.status(),
        expected_status.unwrap_or(ProtocolStatus::UNUSED)
    );
    assert!(outcome.failure_message().starts_with("Exception patching Item \"B\""));
    assert!(outcome.failure_message().contains(&fault_text));
}

#[rstest]
#[tokio::test]
#[should_panic(expected = "identities differ")]
async fn mismatched_identities_panic_before_transport(original: Item) {
    let other = Item::new(ItemId::random(), "A", "", Decimal::from(10), original.created_date())
        .expect("valid item");
    let mut transport = MockItemTransport::new();
    transport.expect_apply_patch().never();

    let _ = client(transport)
        .patch_item(&original, &other, &CancellationToken::new())
        .await;
}

#[rstest]
#[tokio::test]
async fn cancelled_token_fails_without_waiting(original: Item, renamed: Item) {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = ItemClient::new(Arc::new(StalledTransport))
        .patch_item_with_report(&original, &renamed, &cancel)
        .await;

    assert_eq!(report.resolution, PatchResolution::Failed);
    assert_eq!(report.outcome.status(), ProtocolStatus::UNUSED);
    assert!(report.outcome.failure_message().contains("cancelled"));
}

#[rstest]
#[tokio::test]
async fn cancellation_interrupts_a_pending_exchange(original: Item) {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        trigger.cancel();
    });

    let outcome = ItemClient::new(Arc::new(StalledTransport))
        .delete_item(&original, &cancel)
        .await;

    assert!(outcome.is_failure());
    assert!(outcome.failure_message().contains(CANCELLED_BY_CALLER));
}

#[rstest]
#[tokio::test]
async fn get_items_returns_decoded_list(original: Item) {
    let listed = vec![original.clone()];
    let mut transport = MockItemTransport::new();
    transport
        .expect_fetch_all()
        .times(1)
        .return_once(move || Ok(TransportReply::decoded(ProtocolStatus::OK, listed)));

    let outcome = client(transport).get_items(&CancellationToken::new()).await;

    assert_eq!(outcome.status(), ProtocolStatus::OK);
    assert_eq!(outcome.into_value(), vec![original]);
}

#[rstest]
#[case::server_error(TransportReply::empty(ProtocolStatus::INTERNAL_SERVER_ERROR), ProtocolStatus::INTERNAL_SERVER_ERROR, "Error Getting Items from the Server")]
#[case::empty_body(TransportReply::empty(ProtocolStatus::OK), ProtocolStatus::UNUSED, "Cannot deserialize response to item list (status 200): response body was empty")]
#[case::garbage_body(TransportReply::undecodable(ProtocolStatus::OK, "eof"), ProtocolStatus::UNUSED, "Cannot deserialize response to item list (status 200): eof")]
#[tokio::test]
async fn get_items_reports_unusable_replies(
    #[case] reply: TransportReply<Vec<Item>>,
    #[case] status: ProtocolStatus,
    #[case] message: &str,
) {
    let mut transport = MockItemTransport::new();
    transport.expect_fetch_all().return_once(move || Ok(reply));

    let outcome = client(transport).get_items(&CancellationToken::new()).await;

    assert_eq!(outcome.status(), status);
    assert_eq!(outcome.failure_message(), message);
}

#[rstest]
#[tokio::test]
async fn get_item_names_missing_items(original: Item) {
    let mut transport = MockItemTransport::new();
    transport
        .expect_fetch_one()
        .return_once(|_| Ok(TransportReply::empty(ProtocolStatus::NOT_FOUND)));

    let outcome = client(transport)
        .get_item(original.id(), &CancellationToken::new())
        .await;

    assert_eq!(outcome.status(), ProtocolStatus::NOT_FOUND);
    assert_eq!(
        outcome.failure_message(),
        format!("Item {} was not found on the Server", original.id())
    );
}

#[rstest]
#[tokio::test]
async fn create_item_returns_stored_copy(original: Item) {
    let stored = original.clone();
    let mut transport = MockItemTransport::new();
    transport
        .expect_create()
        .withf(|item| item.name == "A")
        .return_once(move |_| Ok(TransportReply::decoded(ProtocolStatus::CREATED, stored)));

    let outcome = client(transport)
        .create_item(
            &NewItem::new("A", "", Decimal::from(10)),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(outcome.status(), ProtocolStatus::CREATED);
    assert_eq!(outcome.value(), &original);
}

#[rstest]
#[tokio::test]
async fn create_item_without_body_is_a_failure() {
    let mut transport = MockItemTransport::new();
    transport
        .expect_create()
        .return_once(|_| Ok(TransportReply::empty(ProtocolStatus::CREATED)));

    let outcome = client(transport)
        .create_item(
            &NewItem::new("Lamp", "", Decimal::ONE),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(outcome.status(), ProtocolStatus::UNUSED);
    assert!(
        outcome
            .failure_message()
            .starts_with("Error deserializing Item \"Lamp\" (status 201)")
    );
}

#[rstest]
#[tokio::test]
async fn update_item_sends_every_field_and_returns_submitted_item(renamed: Item) {
    let expected = renamed.to_update();
    let mut transport = MockItemTransport::new();
    transport
        .expect_replace()
        .withf(move |_, update| update == &expected)
        .times(1)
        .return_once(|_, _| Ok(TransportReply::empty(ProtocolStatus::NO_CONTENT)));

    let outcome = client(transport)
        .update_item(&renamed, &CancellationToken::new())
        .await;

    assert_eq!(outcome.status(), ProtocolStatus::NO_CONTENT);
    assert_eq!(outcome.value(), &renamed);
}

#[rstest]
#[tokio::test]
async fn delete_item_reports_rejections_with_name_and_id(original: Item) {
    let mut transport = MockItemTransport::new();
    transport
        .expect_delete()
        .return_once(|_| Ok(TransportReply::empty(ProtocolStatus::NOT_FOUND)));

    let outcome = client(transport)
        .delete_item(&original, &CancellationToken::new())
        .await;

    assert_eq!(outcome.status(), ProtocolStatus::NOT_FOUND);
    assert_eq!(
        outcome.failure_message(),
        format!("Error deleting Item \"A\" ({})", original.id())
    );
}

#[rstest]
#[tokio::test]
async fn status_feed_receives_one_message_per_operation(original: Item, renamed: Item) {
    let feed = StatusFeed::new();
    let mut transport = MockItemTransport::new();
    transport
        .expect_apply_patch()
        .return_once(|_, _| Ok(TransportReply::empty(ProtocolStatus::NO_CONTENT)));
    transport
        .expect_delete()
        .return_once(|_| Ok(TransportReply::empty(ProtocolStatus::SERVICE_UNAVAILABLE)));
    let client = client(transport).with_status_feed(feed.clone());
    let cancel = CancellationToken::new();

    let _ = client.patch_item(&original, &renamed, &cancel).await;
    assert_eq!(feed.current(), "Patched Item \"B\"");

    let _ = client.delete_item(&renamed, &cancel).await;
    assert_eq!(
        feed.current(),
        format!("Error deleting Item \"B\" ({})", renamed.id())
    );
}
