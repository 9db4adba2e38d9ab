mod common;

use childes_db::prelude::*;
use childes_db::queries::{TARGET_TOKEN, TARGET_UTTERANCE_ID};
use common::{open_fixture, texts};
use tokio::runtime::Runtime;

fn column_ints(rs: &ResultSet, column: &str) -> Vec<i64> {
    rs.column_values(column)
        .unwrap()
        .into_iter()
        .map(|v| *v.as_int().unwrap())
        .collect()
}

#[test]
fn zero_window_returns_the_targets() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (_dir, conn) = open_fixture().await;
        let scope = QueryScope::with_connection(&conn);

        let contexts = get_contexts(&ContextFilter::new("ball"), &scope).await.unwrap();
        assert_eq!(column_ints(&contexts, "id"), vec![1, 2, 3, 8]);
        assert_eq!(column_ints(&contexts, TARGET_UTTERANCE_ID), vec![1, 2, 3, 8]);
        assert!(
            texts(&contexts, TARGET_TOKEN)
                .iter()
                .all(|t| t.as_deref() == Some("ball"))
        );
        assert!(contexts.has_column("utterance_order"));

        conn.close().await;
    });
}

#[test]
fn windows_stay_inside_the_transcript() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (_dir, conn) = open_fixture().await;
        let scope = QueryScope::with_connection(&conn);

        let filter = ContextFilter::new("ball")
            .speakers(SpeakerFilter::default().role("Target_Child"))
            .window(ContextWindow::new(2, 0));
        let contexts = get_contexts(&filter, &scope).await.unwrap();
        // utterance 2 is second in its transcript, utterance 8 third in another
        assert_eq!(column_ints(&contexts, "id"), vec![1, 2, 6, 7, 8]);
        assert_eq!(
            column_ints(&contexts, TARGET_UTTERANCE_ID),
            vec![2, 2, 8, 8, 8]
        );

        conn.close().await;
    });
}

#[test]
fn overlapping_windows_and_duplicates() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (_dir, conn) = open_fixture().await;
        let scope = QueryScope::with_connection(&conn);

        let filter = ContextFilter::new("doggie").window(ContextWindow::new(1, 1));

        let with_dups = get_contexts(&filter.clone().remove_duplicates(false), &scope)
            .await
            .unwrap();
        assert_eq!(column_ints(&with_dups, "id"), vec![3, 4, 5, 4, 5]);
        assert_eq!(
            column_ints(&with_dups, TARGET_UTTERANCE_ID),
            vec![4, 4, 4, 5, 5]
        );

        let deduped = get_contexts(&filter, &scope).await.unwrap();
        assert_eq!(column_ints(&deduped, "id"), vec![3, 4, 5]);
        assert_eq!(column_ints(&deduped, TARGET_UTTERANCE_ID), vec![4, 4, 4]);
        // the token as transcribed, not its replacement
        assert_eq!(
            texts(&deduped, TARGET_TOKEN),
            vec![Some("doggie".into()); 3]
        );

        conn.close().await;
    });
}

#[test]
fn no_matching_tokens() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (_dir, conn) = open_fixture().await;
        let scope = QueryScope::with_connection(&conn);

        let contexts = get_contexts(&ContextFilter::new("zebra"), &scope)
            .await
            .unwrap();
        assert!(contexts.is_empty());

        let err = get_contexts(&ContextFilter::new(3), &scope).await;
        assert!(matches!(err, Err(ChildesDbError::ParameterError(_))));

        conn.close().await;
    });
}

#[test]
fn window_argument_parsing() {
    assert_eq!(
        ContextWindow::try_from(&FilterValue::from([1, 2])).unwrap(),
        ContextWindow::new(1, 2)
    );
    assert!(ContextWindow::try_from(&FilterValue::from([1, 2, 3])).is_err());
    assert_eq!(ContextFilter::new("x").window, ContextWindow::new(0, 0));
}
