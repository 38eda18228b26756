use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

async fn client(server: &MockServer) -> NexonClient {
    NexonClient::new(
        format!("{}/maplestory/v1/", server.uri()),
        Some("test-key".into()),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn resolve_sends_key_and_encoded_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maplestory/v1/id"))
        .and(query_param("character_name", "루미 나"))
        .and(header(API_KEY_HEADER, "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ocid": "abc123"})))
        .mount(&server)
        .await;

    let id = client(&server).await.resolve_identifier("루미 나").await.unwrap();
    assert_eq!(id, Identifier("abc123".into()));
}

#[tokio::test]
async fn resolve_maps_errors_and_missing_ocid_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maplestory/v1/id"))
        .and(query_param("character_name", "ghost"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": {"name": "OPENAPI00004"}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maplestory/v1/id"))
        .and(query_param("character_name", "blank"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let c = client(&server).await;
    assert!(matches!(
        c.resolve_identifier("ghost").await,
        Err(MapleError::NotFound(_))
    ));
    assert!(matches!(
        c.resolve_identifier("blank").await,
        Err(MapleError::NotFound(_))
    ));
}

#[tokio::test]
async fn appearance_passes_date_and_maps_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maplestory/v1/character/basic"))
        .and(query_param("ocid", "abc"))
        .and(query_param("date", "2025-03-04"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "date": "2025-03-04T00:00+09:00",
            "character_name": "Lumi",
            "character_guild_name": null,
            "character_image": "https://open.api.nexon.com/static/maplestory/character/look/XYZ"
        })))
        .mount(&server)
        .await;

    let info = client(&server)
        .await
        .appearance(
            &Identifier("abc".into()),
            NaiveDate::from_ymd_opt(2025, 3, 4),
        )
        .await
        .unwrap();
    assert_eq!(info.display_name, "Lumi");
    assert_eq!(info.guild_name, None);
    assert!(info.image_url.ends_with("/look/XYZ"));
}

#[tokio::test]
async fn dated_endpoints_distinguish_missing_from_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maplestory/v1/character/item-equipment"))
        .and(query_param("date", "2025-01-20"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maplestory/v1/character/item-equipment"))
        .and(query_param("date", "2025-01-21"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maplestory/v1/character/basic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"character_name": null})))
        .mount(&server)
        .await;

    let c = client(&server).await;
    let id = Identifier("abc".into());
    let missing = c
        .equipment_state(&id, NaiveDate::from_ymd_opt(2025, 1, 20))
        .await;
    assert!(matches!(missing, Err(MapleError::NotFound(_))));
    let transient = c
        .equipment_state(&id, NaiveDate::from_ymd_opt(2025, 1, 21))
        .await;
    assert!(matches!(transient, Err(MapleError::Service(_))));
    assert!(matches!(
        c.appearance(&id, None).await,
        Err(MapleError::NotFound(_))
    ));
}

#[tokio::test]
async fn equipment_payload_is_returned_verbatim() {
    let server = MockServer::start().await;
    let body = json!({"date": null, "item_equipment": [{"item_name": "Cap"}]});
    Mock::given(method("GET"))
        .and(path("/maplestory/v1/character/item-equipment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let got = client(&server)
        .await
        .equipment_state(&Identifier("abc".into()), None)
        .await
        .unwrap();
    assert_eq!(got, body);
}
