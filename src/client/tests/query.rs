use super::*;

#[tokio::test]
async fn no_identifiers_means_no_network_calls() {
    let server = MockServer::start().await;

    let mut client = client_for(&server).await;
    let doc = client
        .query(QueryBy::Titles, &ParamList::new(), Vec::<String>::new())
        .await
        .unwrap();

    assert!(doc.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn identifiers_are_chunked_to_the_limit_and_results_merged() {
    let server = MockServer::start().await;
    api_post()
        .and(body_string_contains("titles=Alpha%7CBeta"))
        .respond_with(xml(
            r#"<api><query><pages><page title="Alpha"/><page title="Beta"/></pages></query></api>"#,
        ))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    api_post()
        .and(body_string_contains("titles=Gamma"))
        .respond_with(xml(
            r#"<api><query><pages><page title="Gamma"/></pages></query></api>"#,
        ))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let doc = client
        .query_with_limit(
            QueryBy::Titles,
            &ParamList::new(),
            ["Alpha", "Beta", "Gamma"],
            2,
            true,
        )
        .await
        .unwrap();

    assert_eq!(
        page_titles(&doc, "pages", "page"),
        vec!["Alpha", "Beta", "Gamma"]
    );
}

#[tokio::test]
async fn revision_queries_use_the_revids_keyword() {
    let server = MockServer::start().await;
    api_post()
        .and(body_string_contains("revids=100%7C200"))
        .respond_with(xml("<api><query><pages/></query></api>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    client
        .query(QueryBy::Revisions, &ParamList::new(), ["100", "200"])
        .await
        .unwrap();
}

#[tokio::test]
async fn chunks_run_their_own_continuation_rounds() {
    let server = MockServer::start().await;
    api_post()
        .and(body_string_contains("plcontinue=more"))
        .respond_with(xml(
            r#"<api><query><pages><page title="Alpha-rest"/></pages></query></api>"#,
        ))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    api_post()
        .and(body_string_contains("titles=Alpha"))
        .respond_with(xml(
            r#"<api>
  <query><pages><page title="Alpha"/></pages></query>
  <query-continue><links plcontinue="more"/></query-continue>
</api>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let doc = client
        .query(QueryBy::Titles, &ParamList::new(), ["Alpha"])
        .await
        .unwrap();

    assert_eq!(page_titles(&doc, "pages", "page"), vec!["Alpha", "Alpha-rest"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
