mod common;

use childes_db::prelude::*;
use common::{ids, open_fixture, texts};
use tokio::runtime::Runtime;

#[test]
fn token_patterns() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (_dir, conn) = open_fixture().await;
        let scope = QueryScope::with_connection(&conn);

        let ball = get_tokens(&TokenFilter::new("ball"), &scope).await.unwrap();
        assert_eq!(ids(&ball), vec![5, 6, 10, 21]);

        let prefix = get_tokens(&TokenFilter::new("ball%"), &scope).await.unwrap();
        assert_eq!(ids(&prefix), vec![5, 6, 10, 21, 23, 26]);

        let one_char = get_tokens(&TokenFilter::new("bal_"), &scope).await.unwrap();
        assert_eq!(ids(&one_char), ids(&ball));

        // several patterns are OR-ed
        let either = get_tokens(&TokenFilter::new(["ball", "juice"]), &scope)
            .await
            .unwrap();
        assert_eq!(ids(&either), vec![5, 6, 10, 16, 20, 21]);

        conn.close().await;
    });
}

#[test]
fn token_speaker_filters() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (_dir, conn) = open_fixture().await;
        let scope = QueryScope::with_connection(&conn);
        let ball = |speakers: SpeakerFilter| TokenFilter::new("ball").speakers(speakers);

        let children = get_tokens(&ball(SpeakerFilter::default().role("Target_Child")), &scope)
            .await
            .unwrap();
        assert_eq!(ids(&children), vec![6, 21]);

        let adults = get_tokens(
            &ball(SpeakerFilter::default().role_exclude("Target_Child")),
            &scope,
        )
        .await
        .unwrap();
        assert_eq!(ids(&adults), vec![5, 10]);

        let adam = get_tokens(&ball(SpeakerFilter::default().age(27)), &scope)
            .await
            .unwrap();
        assert_eq!(ids(&adam), vec![5, 6, 10]);

        let french = get_tokens(
            &TokenFilter::new("%").speakers(SpeakerFilter::default().language("fra")),
            &scope,
        )
        .await
        .unwrap();
        assert_eq!(ids(&french), vec![23, 24, 25, 26]);

        let nouns = get_tokens(
            &TokenFilter::new("%")
                .stem("dog")
                .part_of_speech("n"),
            &scope,
        )
        .await
        .unwrap();
        assert_eq!(ids(&nouns), vec![11, 14]);

        conn.close().await;
    });
}

#[test]
fn replacement_rewrites_gloss_after_matching() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (_dir, conn) = open_fixture().await;
        let scope = QueryScope::with_connection(&conn);

        let replaced = get_tokens(&TokenFilter::new("doggie"), &scope).await.unwrap();
        assert_eq!(ids(&replaced), vec![11, 14]);
        assert_eq!(
            texts(&replaced, "gloss"),
            vec![Some("dog".into()), Some("doggie".into())]
        );

        let raw = get_tokens(&TokenFilter::new("doggie").replace(false), &scope)
            .await
            .unwrap();
        assert_eq!(
            texts(&raw, "gloss"),
            vec![Some("doggie".into()), Some("doggie".into())]
        );

        // matching is on the transcribed form
        let by_replacement = get_tokens(&TokenFilter::new("dog"), &scope).await.unwrap();
        assert!(by_replacement.is_empty());

        // an empty replacement leaves the gloss alone
        let yes = get_tokens(&TokenFilter::new("yes"), &scope).await.unwrap();
        assert_eq!(texts(&yes, "gloss"), vec![Some("yes".into())]);

        // a missing replacement is NULL, not the marker
        let unintelligible = get_tokens(&TokenFilter::new("xxx"), &scope).await.unwrap();
        let row = &unintelligible.results[0];
        assert_eq!(row.get("gloss").unwrap().as_text(), Some("xxx"));
        assert!(row.get("replacement").unwrap().is_null());
        assert!(row.get("stem").unwrap().is_null());

        conn.close().await;
    });
}

#[test]
fn types_by_pattern_and_speaker() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (_dir, conn) = open_fixture().await;
        let scope = QueryScope::with_connection(&conn);

        let all = get_types(&TypeFilter::default(), &scope).await.unwrap();
        assert_eq!(all.len(), 7);

        let ball = get_types(&TypeFilter::default().type_pattern("ball"), &scope)
            .await
            .unwrap();
        assert_eq!(ids(&ball), vec![1, 2, 4]);

        let eve_child = get_types(
            &TypeFilter::default().speakers(
                SpeakerFilter::default()
                    .target_child("Eve")
                    .role("Target_Child"),
            ),
            &scope,
        )
        .await
        .unwrap();
        assert_eq!(ids(&eve_child), vec![4, 5]);

        let french = get_types(
            &TypeFilter::default().speakers(SpeakerFilter::default().language("fra")),
            &scope,
        )
        .await
        .unwrap();
        assert_eq!(ids(&french), vec![7]);

        conn.close().await;
    });
}
