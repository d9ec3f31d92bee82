use logship_core::parser::{AccessLogParser, LogParser, ParseError, ParserRegistry};
use logship_core::transform;
use serde_json::json;

#[test]
fn test_access_parser_combined() {
    let parser = AccessLogParser::new();

    let raw = r#"127.0.0.1 - frank [10/Oct/2023:13:55:36 +0200] "GET /apache_pb.gif HTTP/1.0" 200 2326 "http://www.example.com/start.html" "Mozilla/4.08 [en] (Win98; I ;Nav)""#;
    let result = parser.parse(raw);

    assert!(result.is_ok());
    let record = result.unwrap();

    println!("Record: {:?}", record);

    assert_eq!(record["remote_host"], json!("127.0.0.1"));
    assert_eq!(record["ident"], json!("-"));
    assert_eq!(record["user"], json!("frank"));
    assert_eq!(record["datetime"], json!("10/Oct/2023:13:55:36 +0200"));
    assert_eq!(record["date"], json!("10/Oct/2023"));
    assert_eq!(record["time"], json!("13:55:36"));
    assert_eq!(record["timezone"], json!("+0200"));
    assert_eq!(record["request"], json!("GET /apache_pb.gif HTTP/1.0"));
    assert_eq!(record["method"], json!("GET"));
    assert_eq!(record["path"], json!("/apache_pb.gif"));
    assert_eq!(record["protocol"], json!("HTTP/1.0"));
    assert_eq!(record["status"], json!("200"));
    assert_eq!(record["bytes"], json!("2326"));
    assert_eq!(record["referer"], json!("http://www.example.com/start.html"));
    assert_eq!(record["user_agent"], json!("Mozilla/4.08 [en] (Win98; I ;Nav)"));
}

#[test]
fn test_access_parser_common() {
    let parser = AccessLogParser::new();

    // CLF has no referer or user agent
    let raw = r#"10.0.0.1 - - [08/Feb/2024:10:30:00 +0000] "POST /api/crash HTTP/1.1" 500 -"#;
    let record = parser.parse(raw).unwrap();

    assert_eq!(record["status"], json!("500"));
    assert_eq!(record["bytes"], json!("-"));
    assert!(!record.contains_key("referer"));
    assert!(!record.contains_key("user_agent"));
}

#[test]
fn test_access_parser_ignores_line_ending() {
    let parser = AccessLogParser::new();

    let raw = "10.0.0.1 - - [08/Feb/2024:10:30:00 +0000] \"GET / HTTP/1.1\" 200 12\r\n";
    let record = parser.parse(raw).unwrap();
    assert_eq!(record["bytes"], json!("12"));
}

#[test]
fn test_access_parser_escaped_quotes() {
    let parser = AccessLogParser::new();

    let raw = r#"127.0.0.1 - - [10/Oct/2023:14:07:30 +0200] "GET / HTTP/1.1" 200 1532 "-" "Mozilla/5.0 \"escaped\" agent""#;
    let record = parser.parse(raw).unwrap();
    assert_eq!(record["user_agent"], json!(r#"Mozilla/5.0 \"escaped\" agent"#));
}

#[test]
fn test_access_parser_rejects_garbage() {
    let parser = AccessLogParser::new();

    let result = parser.parse("random text that doesnt match");
    assert!(matches!(result, Err(ParseError::NoMatch { format: "access" })));
}

#[test]
fn test_registry_unknown_format() {
    let registry = ParserRegistry::with_defaults();

    assert_eq!(registry.names(), vec!["access"]);
    let result = registry.parse("syslog", "anything");
    assert!(matches!(result, Err(ParseError::UnknownFormat(name)) if name == "syslog"));
}

#[test]
fn test_sample_access_log() {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    let parser = AccessLogParser::new();

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../sample-data/access.log");
    let file = File::open(path).expect("sample access log not found");
    let reader = BufReader::new(file);

    let mut success = 0;
    let mut numeric_bytes = 0;

    for (i, line) in reader.lines().enumerate() {
        let raw = line.unwrap();
        let record = parser
            .parse(&raw)
            .unwrap_or_else(|e| panic!("line {}: {}", i + 1, e));
        let doc = transform(record, "example.com", Some("web-01"))
            .unwrap_or_else(|e| panic!("line {}: {}", i + 1, e));

        assert!(doc["status"].is_number());
        if doc["bytes"].is_number() {
            numeric_bytes += 1;
        }
        assert!(doc["@timestamp"].as_str().unwrap().ends_with('Z'));
        success += 1;
    }

    println!("\n=== Sample Access Log Results ===");
    println!("Total parsed: {}", success);
    println!("Numeric bytes: {}", numeric_bytes);

    assert_eq!(success, 15);
    assert_eq!(numeric_bytes, 11);
}
