//! Edge Worker 适配层
//!
//! 每次调用都是独立的：`dispatch` 接收一个完整的请求和本次调用的配置，返回一个完整的响应，
//! 不依赖任何跨请求状态。与常驻进程形态相比，这里的 `/message`、`/random`、404 返回纯文本，
//! 且没有 `/health`。

mod host;

pub use host::serve;

use bytes::Bytes;
use http::{header, HeaderValue, Method, Request, Response, StatusCode};

use crate::config::ZhipuSettings;
use crate::relay::{relay_chat, ChatOptions, RelayError, Upstream, UpstreamReply};
use crate::utils::random_uuid;

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// 处理一次调用
pub async fn dispatch(
    request: Request<Bytes>,
    env: &ZhipuSettings,
    upstream: &dyn Upstream,
) -> Response<Bytes> {
    if request.method() == Method::OPTIONS {
        return preflight();
    }

    match request.uri().path() {
        "/message" => text(StatusCode::OK, "Hello, World!"),
        "/random" => text(StatusCode::OK, random_uuid()),
        "/chat" => handle_chat(request, env, upstream, ChatOptions::default()).await,
        "/translate" => {
            let options = ChatOptions::persona(&env.translate_prompt);
            handle_chat(request, env, upstream, options).await
        }
        _ => text(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn handle_chat(
    request: Request<Bytes>,
    env: &ZhipuSettings,
    upstream: &dyn Upstream,
    options: ChatOptions<'_>,
) -> Response<Bytes> {
    if request.method() != Method::POST {
        return with_cors(StatusCode::METHOD_NOT_ALLOWED)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Bytes::from_static(b"Method Not Allowed"))
            .unwrap_or_else(|_| fallback_response());
    }

    let result = relay_chat(upstream, env, request.body(), options).await;
    json_result(result)
}

fn json_result(result: Result<UpstreamReply, RelayError>) -> Response<Bytes> {
    let encoded = match &result {
        Ok(reply) => serde_json::to_vec(&reply.body).map(|b| (reply.status, b)),
        Err(err) => serde_json::to_vec(&err.envelope()).map(|b| (err.status(), b)),
    };

    match encoded {
        Ok((status, body)) => with_cors(status)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Bytes::from(body))
            .unwrap_or_else(|_| fallback_response()),
        Err(err) => {
            tracing::error!("Failed to encode response: {}", err);
            fallback_response()
        }
    }
}

fn preflight() -> Response<Bytes> {
    with_cors(StatusCode::OK)
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS)
        .header(header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS)
        .body(Bytes::new())
        .unwrap_or_else(|_| fallback_response())
}

fn text(status: StatusCode, body: impl Into<Bytes>) -> Response<Bytes> {
    with_cors(status)
        .header(header::CONTENT_TYPE, "text/plain;charset=UTF-8")
        .body(body.into())
        .unwrap_or_else(|_| fallback_response())
}

fn with_cors(status: StatusCode) -> http::response::Builder {
    Response::builder()
        .status(status)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
}

/// 仅在响应无法构造时使用
fn fallback_response() -> Response<Bytes> {
    let mut response = Response::new(Bytes::from_static(b"Internal Server Error"));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::testing::{
        client_for, mock_upstream, sent_payloads, settings, unreachable_client,
    };
    use serde_json::{json, Value};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(method: Method, uri: &str, body: &'static str) -> Request<Bytes> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap()
    }

    fn assert_allow_origin(response: &Response<Bytes>) {
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    fn json_body(response: &Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn preflight_answers_before_routing() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        for uri in ["/chat", "/translate", "/does-not-exist"] {
            let response =
                dispatch(request(Method::OPTIONS, uri, "{bad"), &settings(None), &client).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_allow_origin(&response);
            assert_eq!(
                response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
                "GET, POST, OPTIONS"
            );
            assert_eq!(
                response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
                "Content-Type, Authorization"
            );
            assert!(response.body().is_empty());
        }
    }

    #[tokio::test]
    async fn message_and_random_are_plain_text() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let env = settings(None);

        let response = dispatch(request(Method::GET, "/message", ""), &env, &client).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_allow_origin(&response);
        assert_eq!(response.body(), "Hello, World!");

        let first = dispatch(request(Method::GET, "/random", ""), &env, &client).await;
        let second = dispatch(request(Method::GET, "/random", ""), &env, &client).await;
        let first = uuid::Uuid::try_parse_ascii(first.body()).unwrap();
        let second = uuid::Uuid::try_parse_ascii(second.body()).unwrap();
        assert_eq!(first.get_version_num(), 4);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn health_is_not_routed_on_the_edge() {
        let server = MockServer::start().await;
        let response = dispatch(
            request(Method::GET, "/health", ""),
            &settings(None),
            &client_for(&server),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_allow_origin(&response);
        assert_eq!(response.body(), "Not Found");
    }

    #[tokio::test]
    async fn non_post_chat_is_405() {
        let server = MockServer::start().await;
        let response = dispatch(
            request(Method::GET, "/chat", ""),
            &settings(Some("test-key")),
            &client_for(&server),
        )
        .await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_allow_origin(&response);
        assert_eq!(response.body(), "Method Not Allowed");
    }

    #[tokio::test]
    async fn chat_relays_upstream_json() {
        let server = MockServer::start().await;
        let reply = json!({ "id": "x", "choices": [{ "message": { "content": "hey" } }] });
        mock_upstream(&server, 200, reply.clone()).await;

        let response = dispatch(
            request(Method::POST, "/chat", r#"{"content":"hi"}"#),
            &settings(Some("test-key")),
            &client_for(&server),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_allow_origin(&response);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(json_body(&response), reply);

        let sent = sent_payloads(&server).await;
        let messages = sent[0]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], json!({ "role": "user", "content": "hi" }));
    }

    #[tokio::test]
    async fn translate_prepends_system_prompt() {
        let server = MockServer::start().await;
        mock_upstream(&server, 200, json!({ "choices": [] })).await;

        let response = dispatch(
            request(Method::POST, "/translate", r#"{"content":"hello"}"#),
            &settings(Some("test-key")),
            &client_for(&server),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let sent = sent_payloads(&server).await;
        assert_eq!(sent[0]["thinking"], json!({ "type": "disabled" }));
        assert_eq!(
            sent[0]["messages"],
            json!([
                { "role": "system", "content": "You are a translator." },
                { "role": "user", "content": "hello" }
            ])
        );
    }

    #[tokio::test]
    async fn chat_errors_use_the_envelope() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let response = dispatch(
            request(Method::POST, "/chat", "{}"),
            &settings(Some("test-key")),
            &client,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_allow_origin(&response);
        assert_eq!(
            json_body(&response),
            json!({ "error": "缺少必要参数: content" })
        );

        let response = dispatch(
            request(Method::POST, "/chat", r#"{"content":"hi"}"#),
            &settings(None),
            &client,
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(&response), json!({ "error": "未配置 API Key" }));
    }

    #[tokio::test]
    async fn chat_forwards_array_content_and_keeps_reply_order() {
        let server = MockServer::start().await;
        let raw = r#"{"model":"glm-test","id":"c-2","choices":[]}"#;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(raw, "application/json"))
            .mount(&server)
            .await;

        let response = dispatch(
            request(
                Method::POST,
                "/chat",
                r#"{"content":[{"type":"text","text":"hi"}]}"#,
            ),
            &settings(Some("test-key")),
            &client_for(&server),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), raw);

        let sent = sent_payloads(&server).await;
        assert_eq!(
            sent[0]["messages"],
            json!([{ "role": "user", "content": [{ "type": "text", "text": "hi" }] }])
        );
    }

    #[tokio::test]
    async fn upstream_status_is_mirrored() {
        let server = MockServer::start().await;
        mock_upstream(&server, 503, json!({ "error": "busy" })).await;

        let response = dispatch(
            request(Method::POST, "/chat", r#"{"content":"hi"}"#),
            &settings(Some("test-key")),
            &client_for(&server),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_allow_origin(&response);
        let message = json_body(&response)["error"].as_str().unwrap().to_string();
        assert!(message.starts_with("智谱 AI 接口调用失败: 503 "), "{message}");
        assert!(message.contains("busy"), "{message}");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_500_network_error() {
        let response = dispatch(
            request(Method::POST, "/chat", r#"{"content":"hi"}"#),
            &settings(Some("test-key")),
            &unreachable_client(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(&response),
            json!({ "error": "网络请求失败，请检查网络连接" })
        );
    }
}
