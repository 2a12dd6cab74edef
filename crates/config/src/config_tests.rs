//! Unit tests for node configuration

#[cfg(test)]
mod tests {
    use crate::{loader, ConfigError, ConfigSource, NodeConfig, NodeConfigBuilder};
    use serial_test::serial;
    use std::collections::HashMap;
    use std::io::Write;
    use std::net::SocketAddr;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = NodeConfigBuilder::new().build().unwrap();
        let defaults = NodeConfig::default();

        assert_eq!(config.self_url, defaults.self_url);
        assert_eq!(config.peers, vec![defaults.self_url.clone()]);
        assert_eq!(config.replicas, 50);
        assert_eq!(config.base_path, "/_peercache/");
        assert_eq!(config.cache_bytes, 2048);
        assert!(config.api_addr.is_none());
    }

    #[test]
    fn test_file_layer() {
        let file = write_config(
            r#"{
                "self_url": "http://localhost:8002/",
                "peers": ["http://localhost:8001", "http://localhost:8002", "http://localhost:8003"],
                "cache_bytes": 4096,
                "api_addr": "127.0.0.1:9999"
            }"#,
        );

        let builder = NodeConfigBuilder::new().with_file(file.path()).unwrap();
        assert_eq!(
            builder.source(),
            &ConfigSource::ConfigFile(file.path().to_path_buf())
        );
        let config = builder.build().unwrap();

        assert_eq!(config.self_url, "http://localhost:8002");
        assert_eq!(config.peers.len(), 3);
        assert_eq!(config.cache_bytes, 4096);
        assert_eq!(config.replicas, 50);
        assert_eq!(
            config.api_addr,
            Some("127.0.0.1:9999".parse::<SocketAddr>().unwrap())
        );
    }

    #[test]
    fn test_unknown_file_field_is_rejected() {
        let file = write_config(r#"{ "replicaz": 3 }"#);
        let err = NodeConfigBuilder::new().with_file(file.path()).err().unwrap();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = NodeConfigBuilder::new()
            .with_file(std::path::Path::new("/nonexistent/peercache.json"))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_precedence() {
        let file = write_config(r#"{ "replicas": 10, "cache_bytes": 100, "group": "file" }"#);

        let config = NodeConfigBuilder::new()
            .with_file(file.path())
            .unwrap()
            .with_env_from(env(&[
                (loader::ENV_REPLICAS, "20"),
                (loader::ENV_GROUP, "env"),
            ]))
            .unwrap()
            .with_group("cli")
            .build()
            .unwrap();

        assert_eq!(config.cache_bytes, 100);
        assert_eq!(config.replicas, 20);
        assert_eq!(config.group, "cli");
    }

    #[test]
    fn test_env_peers_are_split() {
        let builder = NodeConfigBuilder::new()
            .with_env_from(env(&[
                (loader::ENV_SELF_URL, "http://10.0.0.1:8001"),
                (loader::ENV_PEERS, "http://10.0.0.2:8002, http://10.0.0.3:8003,"),
            ]))
            .unwrap();
        assert!(matches!(
            builder.source(),
            ConfigSource::EnvironmentVariable(_)
        ));

        let config = builder.build().unwrap();
        assert_eq!(
            config.peers,
            vec![
                "http://10.0.0.2:8002".to_string(),
                "http://10.0.0.3:8003".to_string(),
                "http://10.0.0.1:8001".to_string(),
            ]
        );
    }

    #[test]
    fn test_env_bad_number() {
        let err = NodeConfigBuilder::new()
            .with_env_from(env(&[(loader::ENV_CACHE_BYTES, "lots")]))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field, .. } if field == loader::ENV_CACHE_BYTES
        ));
    }

    #[test]
    fn test_validation() {
        let cases = [
            NodeConfigBuilder::new().with_replicas(0),
            NodeConfigBuilder::new().with_base_path("_peercache"),
            NodeConfigBuilder::new().with_base_path("/"),
            NodeConfigBuilder::new().with_self_url("not a url"),
            NodeConfigBuilder::new().with_self_url("ftp://host:21"),
            NodeConfigBuilder::new().with_peers(vec!["http://".to_string()]),
            NodeConfigBuilder::new().with_group(""),
            NodeConfigBuilder::new().with_request_timeout_secs(0),
        ];

        for builder in cases {
            assert!(matches!(
                builder.build(),
                Err(ConfigError::InvalidValue { .. })
            ));
        }
    }

    #[test]
    fn test_zero_request_timeout_is_rejected() {
        let err = NodeConfigBuilder::new()
            .with_env_from(env(&[(loader::ENV_REQUEST_TIMEOUT_SECS, "0")]))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field, .. } if field == "request_timeout_secs"
        ));
    }

    #[test]
    fn test_duplicate_peers_collapse() {
        let config = NodeConfigBuilder::new()
            .with_self_url("http://127.0.0.1:8001")
            .with_peers(vec![
                "http://127.0.0.1:8001/".to_string(),
                "http://127.0.0.1:8001".to_string(),
                "http://127.0.0.1:8002".to_string(),
            ])
            .build()
            .unwrap();

        assert_eq!(config.peers.len(), 2);
    }

    #[test]
    fn test_listen_addr() {
        let config = NodeConfigBuilder::new()
            .with_self_url("http://127.0.0.1:8003")
            .build()
            .unwrap();
        assert_eq!(
            config.listen_addr().unwrap(),
            "127.0.0.1:8003".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    #[serial]
    fn test_process_environment() {
        std::env::set_var(loader::ENV_REPLICAS, "7");
        let result = NodeConfigBuilder::new().with_env();
        std::env::remove_var(loader::ENV_REPLICAS);

        let config = result.unwrap().build().unwrap();
        assert_eq!(config.replicas, 7);
    }
}
