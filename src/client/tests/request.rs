use super::*;

#[tokio::test]
async fn successful_call_parses_the_response_document() {
    let server = MockServer::start().await;
    api_post()
        .respond_with(xml(
            r#"<api><query><pages><page title="Main Page" ns="0"/></pages></query></api>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let doc = client
        .make_request(Action::Query, &ParamList::new())
        .await
        .unwrap();

    let page = doc.find("page").unwrap();
    assert_eq!(page.attr("title"), Some("Main Page"));
    assert!(doc.error().is_none());
}

#[tokio::test]
async fn request_bodies_are_form_encoded_with_defaults() {
    let server = MockServer::start().await;
    api_post()
        .and(body_string_contains("format=xml"))
        .and(body_string_contains("assert=user"))
        .and(body_string_contains("maxlag=5"))
        .and(body_string_contains("titles=Main%20Page"))
        .respond_with(xml("<api><query/></api>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let mut params = ParamList::new();
    params.add("titles", "Main Page").unwrap();
    client.make_request(Action::Query, &params).await.unwrap();
}

#[tokio::test]
async fn maxlag_responses_are_retried_until_the_server_catches_up() {
    let server = MockServer::start().await;
    api_post()
        .respond_with(xml(
            r#"<api><error code="maxlag" info="Waiting for a database server"/></api>"#,
        ))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    api_post()
        .respond_with(xml("<api><query><pages/></query></api>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let doc = client
        .make_request(Action::Query, &ParamList::new())
        .await
        .unwrap();

    assert!(doc.error().is_none());
    assert!(doc.find("pages").is_some());
}

#[tokio::test]
async fn exhausted_maxlag_budget_hands_back_the_error_document() {
    let server = MockServer::start().await;
    api_post()
        .respond_with(xml(
            r#"<api><error code="maxlag" info="Waiting for a database server"/></api>"#,
        ))
        .expect(3)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let doc = client
        .make_request(Action::Query, &ParamList::new())
        .await
        .unwrap();

    // the caller sees the lag error in the document, not as an Err
    let (code, _) = doc.error().unwrap();
    assert_eq!(code, "maxlag");
}

#[tokio::test]
async fn other_error_codes_fail_immediately_without_retries() {
    let server = MockServer::start().await;
    api_post()
        .respond_with(xml(r#"<api><error code="badtoken" info="Invalid token"/></api>"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let err = client
        .make_request(Action::Edit, &ParamList::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Edit { code } if code == "badtoken"));
}

#[tokio::test]
async fn action_result_other_than_success_becomes_a_categorized_error() {
    let server = MockServer::start().await;
    api_post()
        .respond_with(xml(r#"<api><move result="Failure"/></api>"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let err = client
        .make_request(Action::Move, &ParamList::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Move { code } if code == "Failure"));
}

#[tokio::test]
async fn retry_after_header_consumes_an_attempt_and_resends() {
    let server = MockServer::start().await;
    api_post()
        .respond_with(ResponseTemplate::new(200).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    api_post()
        .respond_with(xml("<api><query/></api>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let doc = client
        .make_request(Action::Query, &ParamList::new())
        .await
        .unwrap();
    assert!(!doc.is_empty());
}

#[tokio::test]
async fn spending_every_attempt_on_retry_after_yields_an_empty_document() {
    let server = MockServer::start().await;
    api_post()
        .respond_with(ResponseTemplate::new(200).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let doc = client
        .make_request(Action::Query, &ParamList::new())
        .await
        .unwrap();
    assert!(doc.is_empty());
}

#[tokio::test]
async fn http_errors_surface_as_network_errors() {
    let server = MockServer::start().await;
    api_post()
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let err = client
        .make_request(Action::Query, &ParamList::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network { .. }));
}

#[tokio::test]
async fn raw_page_fetch_returns_text_and_maps_404_to_page_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/index.php"))
        .and(wiremock::matchers::query_param("title", "Sandbox"))
        .respond_with(ResponseTemplate::new(200).set_body_string("== Heading =="))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/index.php"))
        .and(wiremock::matchers::query_param("title", "Missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    assert_eq!(client.load_text("Sandbox").await.unwrap(), "== Heading ==");

    let mut client = client_for(&server).await;
    let err = client.load_text("Missing").await.unwrap_err();
    assert!(matches!(err, Error::PageNotFound(title) if title == "Missing"));
}
