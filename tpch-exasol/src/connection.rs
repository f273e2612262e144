// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Exasol WebSocket connection
//!
//! Login is two frames: `login` returns the server's RSA public key, the
//! credentials frame carries the password encrypted with it. Afterwards
//! each statement is one `execute`, followed by `fetch` frames for result
//! sets larger than the first message.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::net::TcpStream;
use tracing::{debug, info};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Connector, Message, WebSocket};

use tpch_common::{BenchError, ExasolSettings, Result};
use tpch_harness::ResultTable;

use crate::protocol::{
    append_columns, empty_columns, Credentials, ExecuteData, FetchData, PublicKey, Request,
    Response, ResultSetData, SessionAttributes, SessionInfo, StatementResult, PROTOCOL_VERSION,
};

const CLIENT_NAME: &str = "tpch";
const DRIVER_NAME: &str = "tpch-exasol";

/// What the adapter needs from a SQL session
pub trait SqlConnection {
    /// Execute a statement and materialize its result set
    fn query(&mut self, sql: &str) -> Result<ResultTable>;

    /// Execute a statement without fetching rows, returning the number of
    /// rows it produced or affected
    fn execute(&mut self, sql: &str) -> Result<u64>;
}

/// One authenticated Exasol session
pub struct ExaConnection {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    session: SessionInfo,
    fetch_size: u64,
}

impl ExaConnection {
    /// Connect and log in, opening `schema` when given
    pub fn connect(settings: &ExasolSettings, schema: Option<&str>) -> Result<Self> {
        let scheme = if settings.encryption { "wss" } else { "ws" };
        let url = format!("{}://{}", scheme, settings.dsn());
        info!("Connecting to Exasol at {}", url);

        let stream = TcpStream::connect((settings.host.as_str(), settings.port))
            .map_err(|e| BenchError::Engine(format!("cannot reach {}: {}", settings.dsn(), e)))?;
        stream.set_nodelay(true)?;

        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(!settings.validate_certificate)
            .danger_accept_invalid_hostnames(!settings.validate_certificate)
            .build()
            .map_err(|e| BenchError::Engine(format!("TLS setup failed: {}", e)))?;

        let (socket, _) = tungstenite::client_tls_with_config(
            url.as_str(),
            stream,
            None,
            Some(Connector::NativeTls(tls)),
        )
        .map_err(|e| BenchError::Engine(format!("WebSocket handshake failed: {}", e)))?;

        let mut conn = Self {
            socket,
            session: SessionInfo::default(),
            fetch_size: settings.fetch_size,
        };
        conn.login(&settings.user, &settings.password, schema)?;
        Ok(conn)
    }

    fn login(&mut self, user: &str, password: &str, schema: Option<&str>) -> Result<()> {
        let key: PublicKey = self
            .request(&Request::Login {
                protocol_version: PROTOCOL_VERSION,
            })?
            .into_data()?;

        let credentials = Credentials {
            username: user,
            password: encrypt_password(&key.public_key_pem, password)?,
            use_compression: false,
            client_name: CLIENT_NAME,
            driver_name: DRIVER_NAME,
            client_os: std::env::consts::OS,
            client_version: env!("CARGO_PKG_VERSION"),
            attributes: SessionAttributes {
                current_schema: schema,
                autocommit: true,
            },
        };
        self.session = self.request(&credentials)?.into_data()?;

        info!(
            "Logged in to {} {} (session {})",
            self.session.product_name, self.session.release_version, self.session.session_id
        );
        Ok(())
    }

    pub fn session(&self) -> &SessionInfo {
        &self.session
    }

    /// Send one frame and decode the response envelope
    fn request<Req, T>(&mut self, request: &Req) -> Result<Response<T>>
    where
        Req: Serialize,
        T: DeserializeOwned,
    {
        let text = serde_json::to_string(request)?;
        debug!("exasol <- {} bytes", text.len());
        self.socket
            .send(Message::Text(text))
            .map_err(|e| BenchError::Engine(format!("send failed: {}", e)))?;

        loop {
            let message = self
                .socket
                .read()
                .map_err(|e| BenchError::Engine(format!("receive failed: {}", e)))?;
            match message {
                Message::Text(text) => {
                    debug!("exasol -> {} bytes", text.len());
                    return Ok(serde_json::from_str(&text)?);
                }
                Message::Binary(bytes) => {
                    debug!("exasol -> {} bytes (binary)", bytes.len());
                    return Ok(serde_json::from_slice(&bytes)?);
                }
                Message::Close(frame) => {
                    return Err(BenchError::Engine(format!(
                        "connection closed by server: {:?}",
                        frame
                    )))
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }

    fn execute_single(&mut self, sql: &str) -> Result<StatementResult> {
        let data: ExecuteData = self.request(&Request::Execute { sql_text: sql })?.into_data()?;
        data.results
            .into_iter()
            .next()
            .ok_or_else(|| BenchError::Protocol("execute returned no results".to_string()))
    }

    /// Pull every row of a result set, fetching what the first message lacked
    fn materialize(&mut self, result_set: ResultSetData) -> Result<ResultTable> {
        let mut columns = empty_columns(&result_set.columns);
        append_columns(&mut columns, &result_set.data)?;

        if let Some(handle) = result_set.result_set_handle {
            let mut position = result_set.num_rows_in_message;
            while position < result_set.num_rows {
                let fetched: FetchData = self
                    .request(&Request::Fetch {
                        result_set_handle: handle,
                        start_position: position,
                        num_bytes: self.fetch_size,
                    })?
                    .into_data()?;
                if fetched.num_rows == 0 {
                    return Err(BenchError::Protocol(format!(
                        "fetch at row {} of {} returned no rows",
                        position, result_set.num_rows
                    )));
                }
                append_columns(&mut columns, &fetched.data)?;
                position += fetched.num_rows;
            }
            self.close_result_set(handle)?;
        }

        ResultTable::new(columns)
    }

    fn close_result_set(&mut self, handle: i64) -> Result<()> {
        self.request::<_, serde_json::Value>(&Request::CloseResultSet {
            result_set_handles: vec![handle],
        })?
        .into_result()?;
        Ok(())
    }

    /// End the session and close the socket
    pub fn close(mut self) -> Result<()> {
        self.request::<_, serde_json::Value>(&Request::Disconnect)?
            .into_result()?;
        // The server may already have dropped the socket after disconnect
        let _ = self.socket.close(None);
        Ok(())
    }
}

impl SqlConnection for ExaConnection {
    fn query(&mut self, sql: &str) -> Result<ResultTable> {
        match self.execute_single(sql)? {
            StatementResult::ResultSet { result_set } => self.materialize(result_set),
            StatementResult::RowCount { .. } => Err(BenchError::Protocol(
                "statement returned a row count, not a result set".to_string(),
            )),
        }
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        match self.execute_single(sql)? {
            StatementResult::ResultSet { result_set } => {
                if let Some(handle) = result_set.result_set_handle {
                    self.close_result_set(handle)?;
                }
                Ok(result_set.num_rows)
            }
            StatementResult::RowCount { row_count } => Ok(row_count),
        }
    }
}

/// Encrypt a password with the server's PKCS#1 public key, base64 encoded
pub fn encrypt_password(public_key_pem: &str, password: &str) -> Result<String> {
    let key = RsaPublicKey::from_pkcs1_pem(public_key_pem)
        .map_err(|e| BenchError::Protocol(format!("invalid server public key: {}", e)))?;
    let encrypted = key
        .encrypt(&mut rand::thread_rng(), Pkcs1v15Encrypt, password.as_bytes())
        .map_err(|e| BenchError::Protocol(format!("password encryption failed: {}", e)))?;
    Ok(BASE64.encode(encrypted))
}
