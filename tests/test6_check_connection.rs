mod common;

use std::net::TcpListener;
use std::time::Duration;

use childes_db::prelude::*;
use tokio::runtime::Runtime;

/// A loopback port with nothing listening on it.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[test]
fn unreachable_server_is_false_not_an_error() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let args = DbArgs::builder("127.0.0.1")
            .port(closed_port())
            .user("childesdb")
            .password("public")
            .db_name("childes-2021.1")
            .finish();
        let opts = ConnectOptions::builder()
            .db_args(args)
            .connect_timeout(Duration::from_secs(2))
            .finish();
        let source = StaticManifest(DbInfo {
            host: "childes-db.example.org".into(),
            user: "childesdb".into(),
            password: "public".into(),
            current: "2021.1".into(),
            supported: vec!["2021.1".into()],
            historical: Vec::new(),
        });

        assert!(!check_connection_with(&opts, &source).await);
        assert!(matches!(
            connect_with_manifest(&opts, &source).await,
            Err(ChildesDbError::ConnectionError(_))
        ));
    });
}

#[test]
fn unreachable_manifest_is_false() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let opts = ConnectOptions::builder()
            .manifest_url(format!("http://127.0.0.1:{}/childes-db.json", closed_port()))
            .connect_timeout(Duration::from_secs(2))
            .finish();
        assert!(!check_connection(&opts).await);
    });
}

#[test]
fn sqlite_mirror_checks() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (dir, path) = common::fixture_path();
        assert!(check_sqlite_connection(&SqliteOptions::new(path)).await);

        let missing = dir.path().join("not-there.sqlite3");
        let opts = SqliteOptions::new(missing.to_string_lossy());
        assert!(!check_sqlite_connection(&opts).await);
        assert!(matches!(
            ChildesConnection::open_sqlite(&opts).await,
            Err(ChildesDbError::ConnectionError(_))
        ));
        // opening never creates the file
        assert!(!missing.exists());
    });
}

#[test]
fn borrowed_connections_outlive_queries() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let (_dir, conn) = common::open_fixture().await;
        assert_eq!(conn.database_type(), DatabaseType::Sqlite);

        let resolved = resolve_connection(Some(&conn), &ConnectOptions::default())
            .await
            .unwrap();
        assert!(matches!(resolved, ResolvedConnection::Borrowed(_)));
        assert_eq!(resolved.get_table("corpus").await.unwrap().len(), 3);
        resolved.finish().await;

        // still usable after the borrowed handle is finished
        conn.ping().await.unwrap();
        clear_connections([conn]).await;
    });
}
