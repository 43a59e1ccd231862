use crate::test_utils::{connector_config, create_test_app, file_value};
use serde_json::{Value, json};
use wiremock::matchers::{basic_auth, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// End-to-end: a demand with simple, workflow and bloc files is turned into an item, then the
/// same files are attached again as annexes of that item.
#[test_log::test(tokio::test)]
async fn test_e2e_item_then_annexes_from_one_demand() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/forms/subsides/42/"))
        .and(basic_auth("delib-user", "delib-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": {
                "formulaire": file_value("formulaire.pdf", "Rk9STQ=="),
                "budget": null,
                "pieces": "2 pièces",
                "pieces_raw": [
                    {"fichier": file_value("statuts.pdf", "U1RB"), "type": "statuts"},
                    {"fichier": file_value("comptes.pdf", "Q09N"), "type": "comptes"},
                ],
            },
            "workflow": {
                "fields": {"avis": file_value("avis.pdf", "QVZJ")}
            },
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/site/@item"))
        .and(basic_auth("delib-user", "delib-password"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"UID": "item-42", "@id": "point-42"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/site/@annex/item-42"))
        .and(body_partial_json(json!({"@type": "annex", "content_category": "annexe"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"created": true})))
        .expect(4)
        .mount(&server)
        .await;

    let app = create_test_app(vec![connector_config("commune", &format!("{}/site/", server.uri()))]);
    let api_url = format!("{}/api/forms/subsides/42/", server.uri());
    let selectors = json!({
        "blocs_of_files": ["pieces"],
        "workflow_files": ["avis"],
        "simple_files": ["formulaire", "budget"],
    });

    // Create the item with every file embedded
    let mut body = selectors.clone();
    body["api_url"] = json!(&api_url);
    body["title"] = json!("Subside association");
    body["proposingGroup"] = json!("finances");
    let response = app.post("/ia-delib/commune/create-item").json(&body).await;
    response.assert_status_ok();
    let uid = response.json::<Value>()["UID"].as_str().unwrap().to_string();
    assert_eq!(uid, "item-42");

    let requests = server.received_requests().await.unwrap();
    let item_post = requests.iter().find(|r| r.url.path() == "/site/@item").unwrap();
    let sent: Value = serde_json::from_slice(&item_post.body).unwrap();
    let children: Vec<&str> = sent["__children__"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["file"]["filename"].as_str().unwrap())
        .collect();
    assert_eq!(children, vec!["formulaire.pdf", "avis.pdf", "statuts.pdf", "comptes.pdf"]);
    assert_eq!(sent["proposingGroup"], "finances");

    // Attach them again as annexes of the created item
    let mut body = selectors;
    body["api_url"] = json!(&api_url);
    body["UID"] = json!(uid);
    let response = app.post("/ia-delib/commune/add-annexes").json(&body).await;
    response.assert_status_ok();
    let result: Value = response.json();
    assert_eq!(result["data"].as_array().unwrap().len(), 4);
    assert!(result.get("failures").is_none());
}

#[tokio::test]
async fn test_health_and_docs() {
    let app = create_test_app(vec![]);

    let response = app.get("/healthz").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");

    let response = app.get("/docs").await;
    response.assert_status_ok();
    assert!(response.text().contains("iA.Delib connector"));
}

#[tokio::test]
async fn test_no_connectors_lists_empty() {
    let app = create_test_app(vec![]);

    let response = app.get("/ia-delib").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!([]));
}
