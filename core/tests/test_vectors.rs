//! Verify query encoding and build/parse methods against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Comparing decoded pairs and parsed JSON (not raw strings) avoids false
//! negatives from ordering or escaping differences.

use course_core::{
    Course, CourseClient, CoursePatch, CourseQuery, DeleteAck, HttpMethod, HttpRequest, NewCourse, ResponseBody,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> CourseClient {
    CourseClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(encoded: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(encoded.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(
        req.path,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{name}: path"
    );
    let body: Value = match req.body.as_deref() {
        Some(raw) => serde_json::from_str(raw).unwrap(),
        None => Value::Null,
    };
    assert_eq!(body, expected["body"], "{name}: body");
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[test]
fn query_test_vectors() {
    let raw = include_str!("../../test-vectors/query.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let query: CourseQuery = serde_json::from_value(case["input"].clone()).unwrap();

        let mut actual = pairs(&query.encode());
        let mut expected: Vec<(String, String)> = serde_json::from_value(case["expected_pairs"].clone()).unwrap();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected, "{name}");

        let req = client().build_list_courses(&query);
        let (path, qs) = req.path.split_once('?').unwrap();
        assert_eq!(path, format!("{BASE_URL}/courses"), "{name}: path");
        let mut from_request = pairs(qs);
        from_request.sort();
        assert_eq!(from_request, expected, "{name}: request query");
    }
}

// ---------------------------------------------------------------------------
// Record operations
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["id"].as_str().unwrap_or_default();
        let body = ResponseBody::Json(case["simulated_body"].clone());

        match case["operation"].as_str().unwrap() {
            "get" => {
                check_request(name, &c.build_get_course(id), &case["expected_request"]);
                let course = c.parse_course(body).unwrap();
                let expected: Course = serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(course, expected, "{name}: parsed result");
            }
            "create" => {
                let input: NewCourse = serde_json::from_value(case["input"].clone()).unwrap();
                check_request(name, &c.build_create_course(&input).unwrap(), &case["expected_request"]);
                let course = c.parse_course(body).unwrap();
                let expected: Course = serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(course, expected, "{name}: parsed result");
            }
            "update" => {
                let patch: CoursePatch = serde_json::from_value(case["input"].clone()).unwrap();
                check_request(name, &c.build_update_course(id, &patch).unwrap(), &case["expected_request"]);
                let course = c.parse_course(body).unwrap();
                let expected: Course = serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(course, expected, "{name}: parsed result");
            }
            "publish" => {
                let published = case["published"].as_bool().unwrap();
                check_request(name, &c.build_set_published(id, published).unwrap(), &case["expected_request"]);
                let course = c.parse_course(body).unwrap();
                let expected: Course = serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(course, expected, "{name}: parsed result");
            }
            "delete" => {
                check_request(name, &c.build_delete_course(id), &case["expected_request"]);
                let ack = c.parse_delete_course(id, body).unwrap();
                let expected: DeleteAck = serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(ack, expected, "{name}: parsed result");
            }
            other => panic!("{name}: unknown operation {other}"),
        }
    }
}
