use async_trait::async_trait;
use bson::doc;
use mongodb::{Client, Database, options::ClientOptions};
use serde_json::Value;
use tracing::{debug, info, warn};

use stmtdriver_core::{
    dictionary::Dictionary,
    error::{DriverError, DriverResult},
    manager::{ManagerBuilder, TaggedManager},
    report::{Exit, Failure, exit},
};

use crate::{connection::ConnectionString, convert::dictionary_argument, options::ClientConfig};


/// Provenance marker of managers built by this adapter.
pub const PROVENANCE: &str = "stmtdriver-mongodb";

/// A pooled MongoDB client.
#[derive(Debug, Clone)]
pub struct MongoManager {
    client: Client,
    database: Option<String>,
    config: ClientConfig,
}

impl MongoManager {
    pub fn new(client: Client, database: Option<String>, config: ClientConfig) -> Self {
        Self { client, database, config }
    }

    pub fn builder(connection_string: &str) -> MongoManagerBuilder {
        MongoManagerBuilder::new(connection_string)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The database named in the connection string, if any.
    pub fn database(&self) -> Option<Database> {
        self.database.as_deref().map(|name| self.client.database(name))
    }

    pub fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// A connection string and client configuration after option filtering and
/// credential precedence have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConnection {
    pub connection_string: ConnectionString,
    pub config: ClientConfig,
}

pub struct MongoManagerBuilder {
    connection_string: String,
    options: Dictionary,
}

impl MongoManagerBuilder {
    pub fn new(connection_string: &str) -> Self {
        Self {
            connection_string: connection_string.to_string(),
            options: Dictionary::new(),
        }
    }

    /// Sets the driver options. Keys outside the recognized set are ignored.
    pub fn options(mut self, options: Dictionary) -> Self {
        self.options = options;
        self
    }

    /// Resolves the connection without touching the network.
    ///
    /// Credentials embedded in the connection string override `user` and
    /// `password` from the options, and query options already present in the
    /// connection string override options mapped from the dictionary.
    pub fn resolve(&self) -> DriverResult<ResolvedConnection> {
        let mut config = ClientConfig::from_options(&self.options)?;
        let mut connection_string = ConnectionString::parse(&self.connection_string)?;

        if let Some(user) = connection_string.user() {
            config.user = Some(user.to_string());
        }
        if let Some(password) = connection_string.password() {
            config.password = Some(password.to_string());
        }
        connection_string.set_credentials(config.user.clone(), config.password.clone());

        let (mapped, unmapped) = config.uri_options();
        for option in mapped {
            if connection_string.has_option(option.key) {
                debug!(option = option.source, uri_option = option.key, "Connection string overrides option");
            } else {
                connection_string.append_option(option.key, option.value);
            }
        }
        for option in unmapped {
            debug!(option, "Option has no driver equivalent, keeping it in the client config only");
        }

        Ok(ResolvedConnection { connection_string, config })
    }
}

#[async_trait]
impl ManagerBuilder for MongoManagerBuilder {
    type Manager = MongoManager;

    async fn build(self) -> DriverResult<TaggedManager<Self::Manager>> {
        let ResolvedConnection { connection_string, config } = self.resolve()?;
        let redacted = connection_string.redacted();

        let options = ClientOptions::parse(connection_string.render())
            .await
            .map_err(|e| {
                DriverError::malformed(format!(
                    "Provided value (`{}`) is not a valid MongoDB connection string. Error details: {}",
                    redacted, e
                ))
            })?;
        let client = Client::with_options(options)
            .map_err(|e| DriverError::malformed(format!("Invalid MongoDB client options: {}", e)))?;

        if let Err(error) = client.database("admin").run_command(doc! { "ping": 1 }).await {
            warn!(connection = %redacted, error = %error, "Could not connect to MongoDB");
            return Err(DriverError::failed(
                format!("Could not connect to MongoDB at `{}`", redacted),
                error,
            ));
        }

        info!(connection = %redacted, "MongoDB manager ready");

        Ok(TaggedManager::new(
            MongoManager::new(client, connection_string.database().map(str::to_string), config),
            PROVENANCE,
        ))
    }
}

/// Builds a manager from a connection string and an optional options dictionary.
///
/// `options` and `meta`, if provided, must be JSON objects. `meta` is echoed on
/// every exit.
pub async fn create_manager(
    connection_string: &str,
    options: Option<Value>,
    meta: Option<Value>,
) -> Exit<TaggedManager<MongoManager>> {
    let meta = match dictionary_argument(meta) {
        Ok(meta) => meta,
        Err(error) => return Err(Failure::new(error, None)),
    };
    let options = match dictionary_argument(options) {
        Ok(options) => options.unwrap_or_default(),
        Err(error) => return Err(Failure::new(error, meta)),
    };

    exit(
        MongoManagerBuilder::new(connection_string).options(options).build().await,
        meta,
    )
}
