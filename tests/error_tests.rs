use neo4j_reactive::ClientError;

#[test]
fn test_closed_message() {
    assert_eq!(ClientError::Closed.to_string(), "client is closed");
}

#[test]
fn test_no_rows_message() {
    assert_eq!(ClientError::NoRows.to_string(), "query returned no rows");
}

#[test]
fn test_config_message() {
    let err = ClientError::config("NEO4J_FETCH_SIZE", "'x': invalid digit found in string");
    assert_eq!(
        err.to_string(),
        "invalid configuration value for NEO4J_FETCH_SIZE: 'x': invalid digit found in string"
    );
}

#[test]
fn test_neo4j_error_wrapped() {
    let err: ClientError = neo4rs::Error::ConnectionError.into();
    assert!(matches!(err, ClientError::Neo4j(neo4rs::Error::ConnectionError)));
    assert!(err.to_string().starts_with("neo4j error: "));
}
