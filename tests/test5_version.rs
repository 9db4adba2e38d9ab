mod common;

use childes_db::prelude::*;
use common::open_fixture;
use tokio::runtime::Runtime;

fn manifest() -> DbInfo {
    DbInfo {
        host: "childes-db.example.org".into(),
        user: "childesdb".into(),
        password: "public".into(),
        current: "2021.1".into(),
        supported: vec!["2021.1".into(), "2020.1".into()],
        historical: vec!["2018.1".into()],
    }
}

// Resolution itself is covered by `version_resolution`; this only checks that
// the mirror records the version "current" resolves to.
#[test]
fn mirror_records_the_current_manifest_version() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (_dir, conn) = open_fixture().await;
        let scope = QueryScope::with_connection(&conn);

        let info = StaticManifest(manifest()).fetch().await.unwrap();
        let resolved = translate_version("current", None, &info);
        let recorded = get_database_version(&scope).await.unwrap();
        assert_eq!(resolved.as_deref(), Some(recorded.as_str()));

        conn.close().await;
    });
}

#[test]
fn version_resolution() {
    let info = manifest();
    assert_eq!(
        translate_version("2020.1", None, &info).as_deref(),
        Some("2020.1")
    );
    assert_eq!(translate_version("2018.1", None, &info), None);
    assert_eq!(translate_version("1999.9", None, &info), None);

    let elsewhere = DbArgs::builder("localhost").db_name("childes_local").finish();
    assert_eq!(
        translate_version("anything", Some(&elsewhere), &info).as_deref(),
        Some("childes_local")
    );

    // same host as the manifest: the version still has to resolve
    let same_host = DbArgs::builder("childes-db.example.org").finish();
    assert_eq!(
        translate_version("current", Some(&same_host), &info).as_deref(),
        Some("2021.1")
    );
}

#[test]
fn unresolved_versions_fail_before_connecting() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let source = StaticManifest(manifest());
        for version in ["2018.1", "not-a-version"] {
            let opts = ConnectOptions::builder().db_version(version).finish();
            let err = connect_with_manifest(&opts, &source).await.unwrap_err();
            assert!(
                matches!(&err, ChildesDbError::UnresolvedVersion(v) if v == version),
                "{err}"
            );
            assert!(!check_connection_with(&opts, &source).await);
        }
    });
}

#[test]
fn db_name_does_not_override_the_version_on_the_hosted_server() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let source = StaticManifest(manifest());
        let args = DbArgs::builder("childes-db.example.org")
            .db_name("childes_elsewhere")
            .finish();
        let opts = ConnectOptions::builder()
            .db_args(args.clone())
            .db_version("2018.1")
            .finish();
        let err = connect_with_manifest(&opts, &source).await.unwrap_err();
        assert!(
            matches!(&err, ChildesDbError::UnresolvedVersion(v) if v == "2018.1"),
            "{err}"
        );
        assert_eq!(
            translate_version("2020.1", Some(&args), &manifest()).as_deref(),
            Some("2020.1")
        );
    });
}

#[test]
fn version_needs_an_admin_row() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (_dir, conn) = open_fixture().await;
        let scope = QueryScope::with_connection(&conn);

        let (_dir2, path) = common::fixture_path();
        let empty = rusqlite::Connection::open(&path).unwrap();
        empty.execute_batch("DELETE FROM admin").unwrap();
        drop(empty);

        let emptied = ChildesConnection::open_sqlite(&SqliteOptions::new(path))
            .await
            .unwrap();
        let result = get_database_version(&QueryScope::with_connection(&emptied)).await;
        assert!(matches!(result, Err(ChildesDbError::ExecutionError(_))));
        assert_eq!(get_database_version(&scope).await.unwrap(), "2021.1");

        emptied.close().await;
        conn.close().await;
    });
}
