//! IMAP/SMTP transport implementation.
//!
//! Implements [`MailTransport`] using standard IMAP for fetching and SMTP
//! for sending.
//!
//! # Protocol details
//!
//! - IMAP4rev1 (RFC 3501) via `async-imap` over rustls
//! - SMTP with direct TLS or STARTTLS via `lettre`
//! - RFC 5322 message bodies parsed with `mail-parser`

use std::sync::Arc;

use async_imap::types::Fetch;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use lettre::message::{Mailbox, Message as SmtpMessage};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use mail_parser::MessageParser;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use super::{reply_subject, Credentials, MailTransport, Result, TransportError};
use crate::domain::{Address, Message, MessageId};

/// IMAP/SMTP server configuration.
#[derive(Debug, Clone)]
pub struct ImapSmtpConfig {
    /// IMAP server hostname.
    pub imap_host: String,
    /// IMAP server port (typically 993 for TLS).
    pub imap_port: u16,
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (typically 465 for TLS, 587 for STARTTLS).
    pub smtp_port: u16,
    /// Whether to use direct TLS (true) or STARTTLS (false) for SMTP.
    pub use_tls: bool,
}

impl ImapSmtpConfig {
    /// Creates a configuration for a typical TLS setup.
    pub fn tls(imap_host: impl Into<String>, smtp_host: impl Into<String>) -> Self {
        Self {
            imap_host: imap_host.into(),
            imap_port: 993,
            smtp_host: smtp_host.into(),
            smtp_port: 465,
            use_tls: true,
        }
    }

    /// Creates a configuration for a STARTTLS setup.
    pub fn starttls(imap_host: impl Into<String>, smtp_host: impl Into<String>) -> Self {
        Self {
            imap_host: imap_host.into(),
            imap_port: 993,
            smtp_host: smtp_host.into(),
            smtp_port: 587,
            use_tls: false,
        }
    }
}

/// Type alias for the IMAP session with TLS (using tokio-util compat layer).
type ImapSession = async_imap::Session<Compat<TlsStream<TcpStream>>>;

/// IMAP/SMTP mail transport.
///
/// Credentials are supplied at [`connect`](MailTransport::connect) and held
/// only for the lifetime of the connection. Both the IMAP session and the
/// SMTP transport are established during connect; if either fails, no
/// partial connection is retained.
pub struct ImapSmtpTransport {
    /// Server configuration.
    config: ImapSmtpConfig,
    /// Credentials for the live connection.
    credentials: Option<Credentials>,
    /// IMAP session (present when connected).
    session: Option<Arc<Mutex<ImapSession>>>,
    /// SMTP transport (present when connected).
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl ImapSmtpTransport {
    /// Creates a new transport for the given servers.
    ///
    /// The transport is not connected until [`connect`](MailTransport::connect)
    /// is called.
    pub fn new(config: ImapSmtpConfig) -> Self {
        Self {
            config,
            credentials: None,
            session: None,
            mailer: None,
        }
    }

    /// Returns whether both sessions are currently established.
    pub fn is_connected(&self) -> bool {
        self.session.is_some() && self.mailer.is_some()
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ImapSmtpConfig {
        &self.config
    }

    /// Establishes a TLS connection to the IMAP server with the futures
    /// compat wrapper async-imap expects.
    async fn connect_tls(&self) -> Result<Compat<TlsStream<TcpStream>>> {
        let tcp_stream = TcpStream::connect(format!(
            "{}:{}",
            self.config.imap_host, self.config.imap_port
        ))
        .await
        .map_err(|e| TransportError::Connection(format!("TCP connect failed: {}", e)))?;

        let config = ClientConfig::builder()
            .with_root_certificates(RootCertStore::from_iter(
                webpki_roots::TLS_SERVER_ROOTS.iter().cloned(),
            ))
            .with_no_client_auth();

        let connector = TlsConnector::from(Arc::new(config));
        let server_name = ServerName::try_from(self.config.imap_host.clone())
            .map_err(|e| TransportError::Connection(format!("invalid server name: {}", e)))?;

        let tls_stream = connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| TransportError::Connection(format!("TLS handshake failed: {}", e)))?;

        Ok(tls_stream.compat())
    }

    /// Builds the SMTP transport and verifies the server is reachable.
    async fn connect_smtp(
        &self,
        credentials: &Credentials,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let smtp_credentials =
            SmtpCredentials::new(credentials.address.clone(), credentials.secret.clone());

        let mailer: AsyncSmtpTransport<Tokio1Executor> = if self.config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .map_err(|e| TransportError::Connection(format!("SMTP relay error: {}", e)))?
                .credentials(smtp_credentials)
                .port(self.config.smtp_port)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| TransportError::Connection(format!("SMTP relay error: {}", e)))?
                .credentials(smtp_credentials)
                .port(self.config.smtp_port)
                .build()
        };

        let reachable = mailer.test_connection().await.map_err(|e| {
            if e.is_permanent() {
                TransportError::Authentication(format!("SMTP login failed: {}", e))
            } else {
                TransportError::Connection(format!("SMTP connect failed: {}", e))
            }
        })?;

        if !reachable {
            return Err(TransportError::Connection(
                "SMTP server did not accept the connection".to_string(),
            ));
        }

        Ok(mailer)
    }

    /// Gets the live IMAP session.
    fn get_session(&self) -> Result<Arc<Mutex<ImapSession>>> {
        self.session
            .clone()
            .ok_or_else(|| TransportError::Connection("not connected".to_string()))
    }

    /// Parses a fetched IMAP message into a domain [`Message`].
    fn parse_fetch(fetch: &Fetch) -> Option<Message> {
        let uid = fetch.uid?;
        let body_data = fetch.body()?;
        Self::parse_message(uid, body_data)
    }

    /// Parses a raw RFC 5322 message into a domain [`Message`].
    ///
    /// The message id is the RFC 5322 Message-ID when present (so replies
    /// can thread via In-Reply-To), falling back to `INBOX:{uid}`.
    fn parse_message(uid: u32, raw: &[u8]) -> Option<Message> {
        let parsed = MessageParser::default().parse(raw)?;

        let sender = parsed
            .from()
            .and_then(|addrs| addrs.first())
            .map(|addr| Address {
                email: addr.address().unwrap_or("").to_string(),
                name: addr.name().map(|s| s.to_string()),
            })
            .unwrap_or_else(|| Address::new("unknown@unknown.com"));

        let subject = parsed.subject().unwrap_or_default().to_string();
        let body = parsed.body_text(0).unwrap_or_default().to_string();

        let received_at = parsed
            .date()
            .and_then(|d| DateTime::from_timestamp(d.to_timestamp(), 0))
            .unwrap_or_else(Utc::now);

        let id = parsed
            .message_id()
            .map(|mid| MessageId::from(format!("<{}>", mid)))
            .unwrap_or_else(|| MessageId::from(format!("INBOX:{}", uid)));

        Some(Message {
            id,
            subject,
            sender,
            body,
            received_at,
            category: None,
            priority: None,
            is_read: false,
        })
    }

    /// Builds the outgoing RFC 5322 reply message.
    fn build_reply(&self, original: &Message, reply_body: &str) -> Result<SmtpMessage> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| TransportError::Connection("not connected".to_string()))?;

        let from_mailbox: Mailbox = credentials
            .address
            .parse()
            .map_err(|e| TransportError::InvalidRequest(format!("invalid from address: {}", e)))?;

        let to_mailbox: Mailbox = if let Some(ref name) = original.sender.name {
            format!("{} <{}>", name, original.sender.email)
        } else {
            original.sender.email.clone()
        }
        .parse()
        .map_err(|e| TransportError::InvalidRequest(format!("invalid to address: {}", e)))?;

        let mut builder = SmtpMessage::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(reply_subject(&original.subject));

        // Thread the reply when the original id is an RFC Message-ID.
        if original.id.0.starts_with('<') && original.id.0.ends_with('>') {
            builder = builder
                .in_reply_to(original.id.0.clone())
                .references(original.id.0.clone());
        }

        builder
            .body(reply_body.to_string())
            .map_err(|e| TransportError::InvalidRequest(format!("failed to build reply: {}", e)))
    }
}

#[async_trait]
impl MailTransport for ImapSmtpTransport {
    async fn connect(&mut self, credentials: Credentials) -> Result<()> {
        if self.is_connected() {
            return Err(TransportError::InvalidRequest(
                "already connected; disconnect first".to_string(),
            ));
        }
        credentials.validate()?;

        // IMAP session first.
        let tls_stream = self.connect_tls().await?;
        let client = async_imap::Client::new(tls_stream);
        let session = client
            .login(&credentials.address, &credentials.secret)
            .await
            .map_err(|e| {
                TransportError::Authentication(format!("IMAP login failed: {:?}", e.0))
            })?;

        // SMTP second; if it fails, the IMAP session is dropped and no
        // partial connection survives.
        let mailer = self.connect_smtp(&credentials).await?;

        self.session = Some(Arc::new(Mutex::new(session)));
        self.mailer = Some(mailer);
        self.credentials = Some(credentials);

        tracing::info!(
            imap_host = %self.config.imap_host,
            smtp_host = %self.config.smtp_host,
            "mailbox transport connected"
        );
        Ok(())
    }

    async fn fetch(&self, limit: usize) -> Result<Vec<Message>> {
        if limit == 0 {
            return Err(TransportError::InvalidRequest(
                "fetch limit must be positive".to_string(),
            ));
        }

        let session_arc = self.get_session()?;
        let mut session = session_arc.lock().await;

        session
            .select("INBOX")
            .await
            .map_err(|e| TransportError::Protocol(format!("SELECT failed: {}", e)))?;

        let uids = session
            .uid_search("ALL")
            .await
            .map_err(|e| TransportError::Protocol(format!("SEARCH failed: {}", e)))?;

        // Most recent first: UIDs ascend with arrival order.
        let mut uid_list: Vec<u32> = uids.into_iter().collect();
        uid_list.sort_by(|a, b| b.cmp(a));
        uid_list.truncate(limit);

        if uid_list.is_empty() {
            return Ok(vec![]);
        }

        let uid_seq = uid_list
            .iter()
            .map(|u| u.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let mut fetch_stream = session
            .uid_fetch(&uid_seq, "(UID BODY.PEEK[])")
            .await
            .map_err(|e| TransportError::Protocol(format!("FETCH failed: {}", e)))?;

        // Collect the whole batch before returning anything, so a mid-stream
        // failure yields nothing rather than a truncated batch.
        let mut fetched = Vec::new();
        while let Some(fetch_result) = fetch_stream.next().await {
            let fetch = fetch_result
                .map_err(|e| TransportError::Protocol(format!("FETCH stream failed: {}", e)))?;
            if let Some(uid) = fetch.uid {
                match Self::parse_fetch(&fetch) {
                    Some(message) => fetched.push((uid, message)),
                    None => tracing::warn!(uid, "skipping unparseable message"),
                }
            }
        }
        drop(fetch_stream);

        // The server may answer in any order.
        fetched.sort_by(|a, b| b.0.cmp(&a.0));
        let messages: Vec<Message> = fetched.into_iter().map(|(_, m)| m).collect();

        tracing::info!(count = messages.len(), limit, "fetched messages");
        Ok(messages)
    }

    async fn send_reply(&self, original: &Message, reply_body: &str) -> Result<bool> {
        let mailer = self
            .mailer
            .as_ref()
            .ok_or_else(|| TransportError::Connection("not connected".to_string()))?;

        let message = self.build_reply(original, reply_body)?;

        match mailer.send(message).await {
            Ok(_) => {
                tracing::info!(to = %original.sender.email, "reply sent");
                Ok(true)
            }
            // The server answered but refused the message: soft failure,
            // reported as `false` rather than an error.
            Err(e) if e.is_permanent() || e.is_transient() => {
                tracing::warn!(to = %original.sender.email, error = %e, "reply rejected");
                Ok(false)
            }
            Err(e) => Err(TransportError::Connection(format!(
                "SMTP send failed: {}",
                e
            ))),
        }
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(session_arc) = self.session.take() {
            let mut session = session_arc.lock().await;
            session
                .logout()
                .await
                .map_err(|e| TransportError::Protocol(format!("LOGOUT failed: {}", e)))?;
        }
        self.mailer = None;
        self.credentials = None;
        tracing::info!("mailbox transport disconnected");
        Ok(())
    }
}
