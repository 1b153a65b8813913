use std::sync::Arc;
use std::time::Duration;

use harvester_engine::{
    Credential, Endpoint, FailureKind, FetchSettings, Fetcher, ReqwestFetcher, StaticCredential,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn root(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).unwrap()
}

fn fetcher_for(server: &MockServer, settings: FetchSettings) -> ReqwestFetcher {
    let credential = StaticCredential(Credential {
        user: "admin".into(),
        password: "secret".into(),
    });
    ReqwestFetcher::new(settings, root(server), Arc::new(credential)).unwrap()
}

#[test]
fn endpoint_urls_follow_rest_layout() {
    let root = Url::parse("https://baw.example.com:9443/").unwrap();

    let search = Endpoint::Search {
        query: vec![
            ("createdAfter".into(), "2022-01-01T00:00:00Z".into()),
            ("searchFilter".into(), "Hiring Sample".into()),
        ],
    };
    assert_eq!(
        search.url(&root).unwrap().as_str(),
        "https://baw.example.com:9443/rest/bpm/wle/v1/processes/search?createdAfter=2022-01-01T00%3A00%3A00Z&searchFilter=Hiring+Sample"
    );

    let summary = Endpoint::TaskSummary {
        instance_id: "2072".into(),
    };
    assert_eq!(
        summary.url(&root).unwrap().as_str(),
        "https://baw.example.com:9443/rest/bpm/wle/v1/process/2072/taskSummary/"
    );

    let detail = Endpoint::TaskDetail {
        task_id: "5121".into(),
    };
    assert_eq!(
        detail.url(&root).unwrap().as_str(),
        "https://baw.example.com:9443/rest/bpm/wle/v1/task/5121?parts=data"
    );
}

#[test]
fn endpoint_urls_keep_root_path_prefix() {
    let root = Url::parse("https://baw.example.com/bpm/").unwrap();
    let detail = Endpoint::TaskDetail {
        task_id: "7".into(),
    };
    assert_eq!(
        detail.url(&root).unwrap().as_str(),
        "https://baw.example.com/bpm/rest/bpm/wle/v1/task/7?parts=data"
    );
}

#[tokio::test]
async fn fetcher_sends_basic_auth_and_parses_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/bpm/wle/v1/task/42"))
        .and(query_param("parts", "data"))
        .and(basic_auth("admin", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "200",
            "data": { "tkiid": "42", "name": "Review" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let body = fetcher
        .fetch(&Endpoint::TaskDetail {
            task_id: "42".into(),
        })
        .await
        .expect("fetch ok");

    assert_eq!(body["data"]["name"], "Review");
}

#[tokio::test]
async fn fetcher_reports_status_with_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/bpm/wle/v1/process/99/taskSummary/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": "error",
            "Data": { "errorMessage": "CWTBG0019E: Unexpected exception" }
        })))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let err = fetcher
        .fetch(&Endpoint::TaskSummary {
            instance_id: "99".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err.kind,
        FailureKind::HttpStatus {
            status: 404,
            server_message: Some("CWTBG0019E: Unexpected exception".into()),
        }
    );
}

#[tokio::test]
async fn fetcher_treats_non_200_success_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/bpm/wle/v1/task/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let err = fetcher
        .fetch(&Endpoint::TaskDetail {
            task_id: "1".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err.kind,
        FailureKind::HttpStatus {
            status: 204,
            server_message: None,
        }
    );
}

#[tokio::test]
async fn fetcher_fails_on_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/bpm/wle/v1/task/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, FetchSettings::default());
    let err = fetcher
        .fetch(&Endpoint::TaskDetail {
            task_id: "3".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn fetcher_times_out_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/bpm/wle/v1/task/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "data": {} })),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Some(Duration::from_millis(50)),
        ..FetchSettings::default()
    };
    let fetcher = fetcher_for(&server, settings);
    let err = fetcher
        .fetch(&Endpoint::TaskDetail {
            task_id: "slow".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn unresolvable_credential_fails_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = harvester_engine::ConfigCredentialResolver::new(
        harvester_core::CredentialsConfig {
            user: "admin".into(),
            password: String::new(),
            password_env_var: "HARVESTER_FETCH_TEST_UNSET_PASSWORD".into(),
        },
    );
    let fetcher =
        ReqwestFetcher::new(FetchSettings::default(), root(&server), Arc::new(resolver)).unwrap();
    let err = fetcher
        .fetch(&Endpoint::TaskDetail {
            task_id: "1".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::AuthResolutionFailed);
}
