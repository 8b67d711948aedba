use diesel::pg::Pg;
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager, ManagerConfig},
    AsyncPgConnection, RunQueryDsl,
};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use shared_types::SourceRecord;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::SyncError;
use crate::source::{SourceBatch, SourceReader};

pub type DbPool = Pool<AsyncPgConnection>;

/// Accepts any server certificate. The database host is reached over TLS
/// but its certificate chain is not validated; handshake signatures still
/// are.
#[derive(Debug)]
struct AcceptAnyCertificate {
    provider: Arc<CryptoProvider>,
}

impl AcceptAnyCertificate {
    fn new() -> Self {
        Self {
            provider: Arc::new(rustls::crypto::ring::default_provider()),
        }
    }
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

async fn establish_tls_connection(config: String) -> diesel::ConnectionResult<AsyncPgConnection> {
    let tls_config = rustls::ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate::new()))
        .with_no_client_auth();
    let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

    let (client, connection) = tokio_postgres::connect(&config, tls)
        .await
        .map_err(|e| diesel::ConnectionError::BadConnection(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    AsyncPgConnection::try_from(client).await
}

pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, SyncError> {
    let mut manager_config = ManagerConfig::default();
    manager_config.custom_setup =
        Box::new(|url| Box::pin(establish_tls_connection(url.to_string())));

    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
        database_url,
        manager_config,
    );
    Pool::builder(config)
        .max_size(1)
        .build()
        .map_err(|e| SyncError::Source(format!("failed to build connection pool: {}", e)))
}

/// Runs one read-only query and maps every row to `T`.
async fn load_rows<T>(pool: &DbPool, query: &str) -> Result<Vec<T>, SyncError>
where
    T: diesel::QueryableByName<Pg> + Send + 'static,
{
    let mut conn = pool
        .get()
        .await
        .map_err(|e| SyncError::Source(format!("failed to get DB connection: {}", e)))?;

    diesel::sql_query(query)
        .load::<T>(&mut *conn)
        .await
        .map_err(|e| SyncError::Source(format!("query failed: {}", e)))
}

/// Reads records of type `T` from Postgres with one fixed query.
///
/// The pool lives for a single read and is closed afterwards, whatever the
/// outcome.
pub struct DbSource<T> {
    database_url: String,
    query: String,
    _record: PhantomData<T>,
}

impl<T> DbSource<T> {
    pub fn new(database_url: String, query: impl Into<String>) -> Self {
        Self {
            database_url,
            query: query.into(),
            _record: PhantomData,
        }
    }
}

impl<T> SourceReader for DbSource<T>
where
    T: SourceRecord + diesel::QueryableByName<Pg> + Send + 'static,
{
    type Record = T;

    fn describe(&self) -> String {
        let table = self
            .query
            .split_whitespace()
            .skip_while(|word| !word.eq_ignore_ascii_case("from"))
            .nth(1)
            .unwrap_or("query");
        format!("Postgres ({})", table)
    }

    async fn read(&self) -> Result<SourceBatch<T>, SyncError> {
        let pool = establish_connection_pool(&self.database_url)?;
        let rows = load_rows::<T>(&pool, &self.query).await;
        pool.close();
        tracing::debug!("Database pool closed");

        let rows = rows?;
        tracing::info!("Loaded {} rows from {}", rows.len(), self.describe());
        Ok(SourceBatch::new(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::BookingEvent;

    #[test]
    fn test_describe_names_the_main_table() {
        let source: DbSource<BookingEvent> =
            DbSource::new(String::new(), crate::config::DEFAULT_BOOKING_QUERY);
        assert_eq!(source.describe(), "Postgres (booking_events)");
    }

    #[test]
    fn test_any_certificate_is_accepted() {
        let verifier = AcceptAnyCertificate::new();
        let server_name = ServerName::try_from("db.example.com").unwrap();
        let result = verifier.verify_server_cert(
            &CertificateDer::from(vec![0u8; 8]),
            &[],
            &server_name,
            &[],
            UnixTime::now(),
        );
        assert!(result.is_ok());
        assert!(!verifier.supported_verify_schemes().is_empty());
    }
}
