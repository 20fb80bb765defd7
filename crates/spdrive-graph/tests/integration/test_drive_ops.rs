//! DriveItem operations against a mock service

use bytes::Bytes;
use spdrive_core::domain::errors::TransferError;
use spdrive_core::domain::newtypes::RemotePath;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

fn rp(s: &str) -> RemotePath {
    RemotePath::new(s.to_string()).unwrap()
}

fn item_json(id: &str, name: &str, size: u64, parent: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "size": size,
        "lastModifiedDateTime": "2026-03-10T12:00:00Z",
        "parentReference": {
            "path": format!("/drives/{}/root:{}", common::DRIVE_ID, parent),
            "id": "parent-1"
        },
        "file": {}
    })
}

#[tokio::test]
async fn test_get_metadata() {
    let (server, drive) = common::setup_drive_client(3).await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/drives/{}/root:/Documents/report.pdf",
            common::DRIVE_ID
        )))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(item_json("item-1", "report.pdf", 2048, "/Documents")),
        )
        .mount(&server)
        .await;

    let entry = drive
        .get_metadata(&rp("/Documents/report.pdf"))
        .await
        .expect("metadata fetch");
    assert_eq!(entry.id, "item-1");
    assert_eq!(entry.size, 2048);
    assert_eq!(entry.path.as_str(), "/Documents/report.pdf");
    assert!(!entry.is_folder);
}

#[tokio::test]
async fn test_list_children_drains_pagination() {
    let (server, drive) = common::setup_drive_client(3).await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/drives/{}/root:/Documents:/children",
            common::DRIVE_ID
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [item_json("a", "a.txt", 1, "/Documents")],
            "@odata.nextLink": format!("{}/page-two", server.uri())
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page-two"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                item_json("b", "b.txt", 2, "/Documents"),
                {
                    "id": "c",
                    "name": "Sub",
                    "parentReference": {
                        "path": format!("/drives/{}/root:/Documents", common::DRIVE_ID),
                        "id": "parent-1"
                    },
                    "folder": { "childCount": 0 }
                }
            ]
        })))
        .mount(&server)
        .await;

    let children = drive
        .list_children(&rp("/Documents"))
        .await
        .expect("listing");
    assert_eq!(children.len(), 3);
    assert_eq!(children[0].name, "a.txt");
    assert_eq!(children[1].name, "b.txt");
    assert!(children[2].is_folder);
    assert_eq!(children[2].path.as_str(), "/Documents/Sub");
}

#[tokio::test]
async fn test_create_folder() {
    let (server, drive) = common::setup_drive_client(3).await;
    Mock::given(method("POST"))
        .and(path(format!("/drives/{}/root/children", common::DRIVE_ID)))
        .and(body_partial_json(serde_json::json!({
            "name": "Reports",
            "@microsoft.graph.conflictBehavior": "fail"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "folder-1",
            "name": "Reports",
            "parentReference": {
                "path": format!("/drives/{}/root:", common::DRIVE_ID),
                "id": "ROOT"
            },
            "folder": { "childCount": 0 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entry = drive.create_folder(&rp("/Reports")).await.expect("create");
    assert!(entry.is_folder);
    assert_eq!(entry.path.as_str(), "/Reports");
}

#[tokio::test]
async fn test_create_folder_conflict_resolves_to_existing() {
    let (server, drive) = common::setup_drive_client(3).await;
    Mock::given(method("POST"))
        .and(path(format!("/drives/{}/root/children", common::DRIVE_ID)))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "error": { "code": "nameAlreadyExists", "message": "The name already exists" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/drives/{}/root:/Reports", common::DRIVE_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "folder-1",
            "name": "Reports",
            "parentReference": {
                "path": format!("/drives/{}/root:", common::DRIVE_ID),
                "id": "ROOT"
            },
            "folder": { "childCount": 3 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entry = drive
        .create_folder(&rp("/Reports"))
        .await
        .expect("conflict should resolve to the existing folder");
    assert_eq!(entry.id, "folder-1");
    assert!(entry.is_folder);
}

#[tokio::test]
async fn test_delete_tolerates_missing_item() {
    let (server, drive) = common::setup_drive_client(3).await;
    Mock::given(method("DELETE"))
        .and(path(format!("/drives/{}/root:/gone.txt", common::DRIVE_ID)))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": "itemNotFound", "message": "not found" }
        })))
        .mount(&server)
        .await;

    drive
        .delete(&rp("/gone.txt"))
        .await
        .expect("deleting an absent item is a success");
}

#[tokio::test]
async fn test_move_item() {
    let (server, drive) = common::setup_drive_client(3).await;
    Mock::given(method("PATCH"))
        .and(path(format!("/drives/{}/root:/old.txt", common::DRIVE_ID)))
        .and(body_partial_json(serde_json::json!({
            "name": "new.txt",
            "parentReference": {
                "path": format!("/drives/{}/root:/Archive", common::DRIVE_ID)
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(item_json("m-1", "new.txt", 7, "/Archive")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let entry = drive
        .move_item(&rp("/old.txt"), &rp("/Archive/new.txt"))
        .await
        .expect("move");
    assert_eq!(entry.path.as_str(), "/Archive/new.txt");
}

#[tokio::test]
async fn test_create_share_link() {
    let (server, drive) = common::setup_drive_client(3).await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/drives/{}/root:/doc.pdf:/createLink",
            common::DRIVE_ID
        )))
        .and(body_partial_json(serde_json::json!({
            "type": "view",
            "scope": "organization"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "link-1",
            "link": { "webUrl": "https://contoso.sharepoint.com/:b:/s/x/abc" }
        })))
        .mount(&server)
        .await;

    let url = drive
        .create_share_link(&rp("/doc.pdf"), "view", "organization")
        .await
        .expect("share link");
    assert!(url.starts_with("https://contoso.sharepoint.com/"));
}

#[tokio::test]
async fn test_read_range_sends_range_header() {
    let (server, drive) = common::setup_drive_client(3).await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/drives/{}/root:/data.bin:/content",
            common::DRIVE_ID
        )))
        .and(header("Range", "bytes=10-19"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(b"0123456789".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = drive
        .read_range(&rp("/data.bin"), 10, 10)
        .await
        .expect("range read");
    assert_eq!(bytes.as_ref(), b"0123456789");
}

#[tokio::test]
async fn test_upload_small_put() {
    let (server, drive) = common::setup_drive_client(3).await;
    Mock::given(method("PUT"))
        .and(path(format!(
            "/drives/{}/root:/notes.txt:/content",
            common::DRIVE_ID
        )))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(item_json("n-1", "notes.txt", 5, "")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let entry = drive
        .upload_small(&rp("/notes.txt"), Bytes::from_static(b"hello"))
        .await
        .expect("small upload");
    assert_eq!(entry.name, "notes.txt");
    assert_eq!(entry.size, 5);
}

#[tokio::test]
async fn test_read_range_missing_file_is_fatal() {
    let (server, drive) = common::setup_drive_client(3).await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/drives/{}/root:/nope.bin:/content",
            common::DRIVE_ID
        )))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": "itemNotFound", "message": "not found" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = drive.read_range(&rp("/nope.bin"), 0, 10).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(matches!(err, TransferError::Remote { .. }));
}

#[tokio::test]
async fn test_read_range_recovers_from_transient_errors() {
    let (server, drive) = common::setup_drive_client(4).await;
    let content_path = format!("/drives/{}/root:/flaky.bin:/content", common::DRIVE_ID);
    Mock::given(method("GET"))
        .and(path(content_path.as_str()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(content_path.as_str()))
        .and(header("Range", "bytes=8-11"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(b"wxyz".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = drive
        .read_range(&rp("/flaky.bin"), 8, 4)
        .await
        .expect("segment should survive transient failures");
    assert_eq!(bytes.as_ref(), b"wxyz");
}
