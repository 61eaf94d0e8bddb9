//! Manager options: whitelist filtering and mapping onto connection string options.
//!
//! Only the options listed in [`RECOGNIZED_OPTIONS`] are kept; any other key is
//! dropped without notice. Kept options with a URI equivalent in the Rust driver
//! are appended to the connection string, the rest stay in the [`ClientConfig`].

use serde_json::Value;

use stmtdriver_core::{
    dictionary::Dictionary,
    error::{DriverError, DriverResult},
};


/// Every option key a manager builder accepts.
pub const RECOGNIZED_OPTIONS: [&str; 35] = [
    // TLS
    "ssl",
    "sslValidate",
    "sslCA",
    "sslCert",
    "sslKey",
    "sslPass",
    // Connection
    "poolSize",
    "autoReconnect",
    "noDelay",
    "keepAlive",
    "connectTimeoutMS",
    "socketTimeoutMS",
    "reconnectTries",
    "reconnectInterval",
    // Topology, concerns and serialization
    "ha",
    "haInterval",
    "replicaSet",
    "secondaryAcceptableLatencyMS",
    "acceptableLatencyMS",
    "connectWithNoPrimary",
    "authSource",
    "w",
    "wtimeout",
    "j",
    "forceServerObjectId",
    "serializeFunctions",
    "ignoreUndefined",
    "raw",
    "promoteLongs",
    "bufferMaxEntries",
    "readPreference",
    "pkFactory",
    "readConcern",
    // Credentials
    "user",
    "password",
];

/// How an option value is written into the connection string.
#[derive(Debug, Clone, Copy)]
enum Encoding {
    Flag,
    InvertedFlag,
    Text,
    Integer,
    WriteConcern,
    ReadConcern,
}

/// Options with a connection string equivalent, in precedence order. When two
/// options map to the same URI key, the first one present wins.
const URI_MAPPINGS: [(&str, &str, Encoding); 17] = [
    ("ssl", "tls", Encoding::Flag),
    ("sslValidate", "tlsAllowInvalidCertificates", Encoding::InvertedFlag),
    ("sslCA", "tlsCAFile", Encoding::Text),
    ("sslCert", "tlsCertificateKeyFile", Encoding::Text),
    ("sslKey", "tlsCertificateKeyFile", Encoding::Text),
    ("poolSize", "maxPoolSize", Encoding::Integer),
    ("connectTimeoutMS", "connectTimeoutMS", Encoding::Integer),
    ("replicaSet", "replicaSet", Encoding::Text),
    ("acceptableLatencyMS", "localThresholdMS", Encoding::Integer),
    ("secondaryAcceptableLatencyMS", "localThresholdMS", Encoding::Integer),
    ("haInterval", "heartbeatFrequencyMS", Encoding::Integer),
    ("authSource", "authSource", Encoding::Text),
    ("w", "w", Encoding::WriteConcern),
    ("wtimeout", "wtimeoutMS", Encoding::Integer),
    ("j", "journal", Encoding::Flag),
    ("readPreference", "readPreference", Encoding::Text),
    ("readConcern", "readConcernLevel", Encoding::ReadConcern),
];

/// An option translated into a connection string query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriOption {
    /// The option key it came from.
    pub source: &'static str,
    pub key: &'static str,
    pub value: String,
}

/// The resolved driver configuration of a manager.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientConfig {
    /// Whitelisted options, credentials excluded.
    pub options: Dictionary,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ClientConfig {
    /// Filters `options` against [`RECOGNIZED_OPTIONS`]. Null values count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Malformed`] if `user` or `password` is not a string.
    pub fn from_options(options: &Dictionary) -> DriverResult<Self> {
        let mut config = ClientConfig::default();

        for key in RECOGNIZED_OPTIONS {
            let Some(value) = options.get(key).filter(|value| !value.is_null()) else {
                continue;
            };

            match key {
                "user" => config.user = Some(credential(key, value)?),
                "password" => config.password = Some(credential(key, value)?),
                _ => {
                    config.options.insert(key, value.clone());
                }
            }
        }

        Ok(config)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Splits the kept options into those expressible as URI options and the keys
    /// of those that are not.
    pub fn uri_options(&self) -> (Vec<UriOption>, Vec<&str>) {
        let mut mapped: Vec<UriOption> = Vec::new();

        for (source, key, encoding) in URI_MAPPINGS {
            if mapped.iter().any(|option| option.key == key) {
                continue;
            }
            let Some(value) = self.options.get(source).and_then(|value| encode(encoding, value)) else {
                continue;
            };
            mapped.push(UriOption { source, key, value });
        }

        let unmapped = self
            .options
            .keys()
            .map(String::as_str)
            .filter(|key| !mapped.iter().any(|option| option.source == *key))
            .collect();

        (mapped, unmapped)
    }
}

fn credential(key: &str, value: &Value) -> DriverResult<String> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        DriverError::malformed(format!("Option `{}` must be a string, but got `{}`.", key, value))
    })
}

fn encode(encoding: Encoding, value: &Value) -> Option<String> {
    match (encoding, value) {
        (Encoding::Flag, Value::Bool(flag)) => Some(flag.to_string()),
        (Encoding::InvertedFlag, Value::Bool(flag)) => Some((!flag).to_string()),
        (Encoding::Text, Value::String(text)) => Some(text.clone()),
        (Encoding::Integer, Value::Number(number)) => number.as_u64().map(|n| n.to_string()),
        (Encoding::WriteConcern, Value::String(text)) => Some(text.clone()),
        (Encoding::WriteConcern, Value::Number(number)) => number.as_u64().map(|n| n.to_string()),
        (Encoding::ReadConcern, Value::String(level)) => Some(level.clone()),
        (Encoding::ReadConcern, Value::Object(concern)) => {
            concern.get("level").and_then(Value::as_str).map(str::to_string)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(options: Value) -> ClientConfig {
        ClientConfig::from_options(&Dictionary::from_value(options).unwrap()).unwrap()
    }

    #[test]
    fn test_unrecognized_options_are_dropped() {
        let config = config(json!({
            "evilShellCommand": "rm -rf /",
            "poolSize": 5,
            "socketTimeoutMS": null,
            "user": "bob",
        }));

        assert_eq!(config.options, Dictionary::new().with("poolSize", 5));
        assert_eq!(config.user.as_deref(), Some("bob"));
        assert_eq!(config.password, None);
        assert_eq!(config.get("evilShellCommand"), None);
    }

    #[test]
    fn test_non_string_credentials_are_malformed() {
        let options = Dictionary::new().with("password", 1234);

        assert!(ClientConfig::from_options(&options).is_err());
    }

    #[test]
    fn test_uri_mapping() {
        let config = config(json!({
            "ssl": true,
            "sslValidate": false,
            "sslKey": "/etc/key.pem",
            "poolSize": 20,
            "secondaryAcceptableLatencyMS": 30,
            "acceptableLatencyMS": 15,
            "w": "majority",
            "j": true,
            "readConcern": { "level": "local" },
            "socketTimeoutMS": 1000,
            "autoReconnect": true,
        }));
        let (mapped, mut unmapped) = config.uri_options();
        unmapped.sort();

        assert_eq!(
            mapped
                .iter()
                .map(|option| (option.key, option.value.as_str()))
                .collect::<Vec<_>>(),
            vec![
                ("tls", "true"),
                ("tlsAllowInvalidCertificates", "true"),
                ("tlsCertificateKeyFile", "/etc/key.pem"),
                ("maxPoolSize", "20"),
                ("localThresholdMS", "15"),
                ("w", "majority"),
                ("journal", "true"),
                ("readConcernLevel", "local"),
            ]
        );
        assert_eq!(unmapped, vec!["autoReconnect", "secondaryAcceptableLatencyMS", "socketTimeoutMS"]);
    }

    #[test]
    fn test_values_without_uri_form_stay_unmapped() {
        let config = config(json!({ "sslCA": ["cert-a", "cert-b"], "poolSize": -1 }));
        let (mapped, mut unmapped) = config.uri_options();
        unmapped.sort();

        assert!(mapped.is_empty());
        assert_eq!(unmapped, vec!["poolSize", "sslCA"]);
    }
}
