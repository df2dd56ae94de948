//! Conversions at the JavaScript boundary. Run with `wasm-pack test --node`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use workspace_tabs::chrome::to_js;
use workspace_tabs::messages::{MessageSender, Request, Response};
use workspace_tabs::workspace_data::{TabInfo, WorkspaceData};

fn js(json: &str) -> JsValue {
    js_sys::JSON::parse(json).unwrap()
}

fn get(value: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn test_request_from_js_object() {
    let request: Request =
        serde_wasm_bindgen::from_value(js(r#"{"type": "switchWorkspace", "workspaceId": "w2"}"#)).unwrap();

    assert_eq!(
        request,
        Request::SwitchWorkspace {
            workspace_id: "w2".to_string()
        }
    );
}

#[wasm_bindgen_test]
fn test_unhandled_message_is_rejected() {
    let result = serde_wasm_bindgen::from_value::<Request>(js(r#"{"type": "openSettings"}"#));
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn test_sender_from_js_object() {
    let sender: MessageSender = serde_wasm_bindgen::from_value(js(
        r#"{"id": "abc", "url": "https://a.com", "tab": {"id": 12, "windowId": 4, "active": true}}"#,
    ))
    .unwrap();

    assert_eq!(sender.window_id(), Some(4));
}

#[wasm_bindgen_test]
fn test_response_is_plain_object() {
    let value = to_js(&Response::success()).unwrap();
    assert_eq!(get(&value, "success").as_bool(), Some(true));
    assert!(get(&value, "error").is_undefined());

    let value = to_js(&Response::CurrentWorkspace {
        workspace_id: "default".to_string(),
    })
    .unwrap();
    assert_eq!(get(&value, "workspaceId").as_string().as_deref(), Some("default"));
}

#[wasm_bindgen_test]
fn test_tabs_from_chrome_objects() {
    let tabs: Vec<TabInfo> = serde_wasm_bindgen::from_value(js(
        r#"[{"id": 1, "windowId": 2, "url": "https://a.com", "title": "A", "active": true, "pinned": false, "index": 0},
            {"id": 2, "windowId": 2, "pendingUrl": "https://b.com", "active": false, "index": 1}]"#,
    ))
    .unwrap();

    assert_eq!(tabs[0], TabInfo::new(1, 2, "https://a.com", "A", true));
    assert_eq!(tabs[1].url, None);
    assert_eq!(tabs[1].current_url(), Some("https://b.com"));
}

#[wasm_bindgen_test]
fn test_document_survives_js_round_trip() {
    let data = WorkspaceData::with_default_workspace(1.0);

    let value = to_js(&data).unwrap();
    assert_eq!(get(&value, "currentWorkspaceId").as_string().as_deref(), Some("default"));

    let back: WorkspaceData = serde_wasm_bindgen::from_value(value).unwrap();
    assert_eq!(back, data);
}
