//! Document store read collaborator
//!
//! The pipeline consumes the source through the [`DocumentSource`] trait;
//! [`MongoSource`] is the production adapter over the official driver. Tests
//! substitute in-memory sources.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, Credential};
use mongodb::Client;
use tracing::debug;

use crate::config::MongoCredentials;
use crate::mappings::CollectionMapping;

/// Yields the documents of one source collection
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Open a full read over the mapped collection. Documents arrive in
    /// undefined order; failures surface as stream items or as the initial
    /// error.
    async fn stream_collection(
        &self,
        mapping: &CollectionMapping,
    ) -> Result<BoxStream<'static, Result<Document>>>;
}

/// MongoDB-backed [`DocumentSource`]
///
/// Credentials are attached through the driver's credential type rather than
/// interpolated into the connection string, so the driver owns any escaping.
pub struct MongoSource {
    credentials: MongoCredentials,
}

impl MongoSource {
    pub fn new(credentials: MongoCredentials) -> Self {
        Self { credentials }
    }

    /// Connection string for a mapped host. Carries no credentials.
    fn connection_uri(host: &str) -> String {
        format!("mongodb://{}", host)
    }
}

#[async_trait]
impl DocumentSource for MongoSource {
    async fn stream_collection(
        &self,
        mapping: &CollectionMapping,
    ) -> Result<BoxStream<'static, Result<Document>>> {
        let uri = Self::connection_uri(&mapping.host_name);
        let mut options = ClientOptions::parse(&uri)
            .await
            .with_context(|| format!("invalid source host '{}'", mapping.host_name))?;
        options.credential = Some(
            Credential::builder()
                .username(self.credentials.username.clone())
                .password(self.credentials.password.clone())
                .build(),
        );

        let client = Client::with_options(options)
            .with_context(|| format!("failed to connect to '{}'", mapping.host_name))?;

        debug!(
            host = %mapping.host_name,
            database = %mapping.database_name,
            collection = %mapping.collection_name,
            "Opening source cursor"
        );

        let cursor = client
            .database(&mapping.database_name)
            .collection::<Document>(&mapping.collection_name)
            .find(doc! {})
            .await
            .with_context(|| {
                format!(
                    "failed to read collection '{}.{}' on '{}'",
                    mapping.database_name, mapping.collection_name, mapping.host_name
                )
            })?;

        Ok(cursor.map_err(anyhow::Error::from).boxed())
    }
}
