use crate::helpers::spawn_app;

#[tokio::test]
async fn healthcheck_answers_no_content() {
    // GIVEN
    let app = spawn_app().await;

    // WHEN
    let result = app.healthcheck().await;

    // THEN
    assert_eq!(204, result.status().as_u16());
    assert!(result.text().await.unwrap().is_empty());
    assert_eq!(0, app.smtp_server.connections());
}
