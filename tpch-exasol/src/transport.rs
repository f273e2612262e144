// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! HTTP transport tunnel for bulk loading
//!
//! The client opens a plain TCP connection to an Exasol node and sends a
//! 12-byte handshake; the node answers with the internal address it will
//! use for `IMPORT ... FROM CSV AT 'http://<address>'`. When the IMPORT
//! runs, Exasol sends an HTTP request down the same socket and the client
//! answers with the file as a chunked response.
//!
//! ```text
//! client -> [i32 LE magic][i32 LE 1][i32 LE 1]
//! server -> [i32 LE unused][i32 LE port][16 bytes ip, NUL padded]
//! ```
//!
//! Only unencrypted tunnels are supported.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::path::Path;
use tracing::{debug, info};

use tpch_common::utils::format_bytes;
use tpch_common::{BenchError, Result};

pub const TUNNEL_MAGIC: i32 = 0x0221_2102;

/// Bytes buffered before a chunk is written
const CHUNK_SIZE: usize = 64 * 1024;

/// Largest HTTP request head accepted from the server
const MAX_HEAD_SIZE: usize = 16 * 1024;

const RESPONSE_HEAD: &str = "HTTP/1.1 200 OK\r\n\
Content-type: application/octet-stream\r\n\
Content-disposition: attachment; filename=data.csv\r\n\
Connection: close\r\n\
Transfer-encoding: chunked\r\n\r\n";

/// An established tunnel, not yet serving
#[derive(Debug)]
pub struct TransportTunnel {
    stream: TcpStream,
    ip: String,
    port: u16,
}

impl TransportTunnel {
    pub fn open(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port)).map_err(|e| {
            BenchError::Engine(format!("cannot open transport tunnel to {}:{}: {}", host, port, e))
        })?;
        Self::handshake(stream)
    }

    /// Run the tunnel handshake on a connected stream
    pub fn handshake(mut stream: TcpStream) -> Result<Self> {
        stream.write_i32::<LittleEndian>(TUNNEL_MAGIC)?;
        stream.write_i32::<LittleEndian>(1)?;
        stream.write_i32::<LittleEndian>(1)?;
        stream.flush()?;

        let _ = stream.read_i32::<LittleEndian>()?;
        let port = stream.read_i32::<LittleEndian>()?;
        let mut ip = [0u8; 16];
        stream.read_exact(&mut ip)?;

        let port = u16::try_from(port)
            .map_err(|_| BenchError::Protocol(format!("tunnel returned invalid port {}", port)))?;
        let ip = String::from_utf8_lossy(&ip)
            .trim_end_matches('\0')
            .to_string();
        if ip.is_empty() {
            return Err(BenchError::Protocol("tunnel returned an empty address".to_string()));
        }

        debug!("Transport tunnel internal address {}:{}", ip, port);
        Ok(Self { stream, ip, port })
    }

    /// Internal `ip:port` for the IMPORT statement
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    /// A handle that can abort the tunnel from another thread
    pub fn shutdown_handle(&self) -> Result<TunnelShutdown> {
        Ok(TunnelShutdown(self.stream.try_clone()?))
    }

    /// Serve a dbgen table file
    pub fn serve_file(self, path: &Path) -> Result<u64> {
        let file = File::open(path)
            .map_err(|e| BenchError::Config(format!("cannot open {:?}: {}", path, e)))?;
        let bytes = self.serve(BufReader::new(file))?;
        info!("Streamed {} from {:?}", format_bytes(bytes), path);
        Ok(bytes)
    }

    /// Wait for the server's HTTP request, then stream `reader` as the
    /// chunked response body. Returns the number of body bytes sent.
    pub fn serve<R: BufRead>(mut self, mut reader: R) -> Result<u64> {
        let head = read_request_head(&mut self.stream)?;
        debug!(
            "Tunnel request: {}",
            head.lines().next().unwrap_or_default()
        );

        self.stream.write_all(RESPONSE_HEAD.as_bytes())?;

        let mut sent = 0u64;
        let mut chunk = Vec::with_capacity(CHUNK_SIZE + 1024);
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            strip_trailing_separator(&mut line);
            chunk.extend_from_slice(&line);
            if chunk.len() >= CHUNK_SIZE {
                sent += write_chunk(&mut self.stream, &chunk)?;
                chunk.clear();
            }
        }
        if !chunk.is_empty() {
            sent += write_chunk(&mut self.stream, &chunk)?;
        }

        self.stream.write_all(b"0\r\n\r\n")?;
        self.stream.flush()?;
        let _ = self.stream.shutdown(Shutdown::Write);
        Ok(sent)
    }
}

/// Aborts a tunnel that is blocked waiting for the server
#[derive(Debug)]
pub struct TunnelShutdown(TcpStream);

impl TunnelShutdown {
    pub fn shutdown(&self) {
        let _ = self.0.shutdown(Shutdown::Both);
    }
}

fn read_request_head(stream: &mut TcpStream) -> Result<String> {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        if stream.read(&mut byte)? == 0 {
            return Err(BenchError::Protocol(
                "tunnel closed before the HTTP request arrived".to_string(),
            ));
        }
        head.push(byte[0]);
        if head.len() > MAX_HEAD_SIZE {
            return Err(BenchError::Protocol("HTTP request head too large".to_string()));
        }
    }
    Ok(String::from_utf8_lossy(&head).into_owned())
}

fn write_chunk<W: Write>(writer: &mut W, data: &[u8]) -> Result<u64> {
    write!(writer, "{:x}\r\n", data.len())?;
    writer.write_all(data)?;
    writer.write_all(b"\r\n")?;
    Ok(data.len() as u64)
}

/// dbgen terminates every row with the column separator; drop it
fn strip_trailing_separator(line: &mut Vec<u8>) {
    let end = if line.ends_with(b"\r\n") {
        line.len() - 2
    } else if line.ends_with(b"\n") {
        line.len() - 1
    } else {
        line.len()
    };
    if end > 0 && line[end - 1] == b'|' {
        line.remove(end - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_trailing_separator() {
        let mut row = b"1|AFRICA|lar deposits|\n".to_vec();
        strip_trailing_separator(&mut row);
        assert_eq!(row, b"1|AFRICA|lar deposits\n");

        let mut last = b"2|AMERICA|hs use ironic|".to_vec();
        strip_trailing_separator(&mut last);
        assert_eq!(last, b"2|AMERICA|hs use ironic");

        let mut plain = b"3|ASIA\n".to_vec();
        strip_trailing_separator(&mut plain);
        assert_eq!(plain, b"3|ASIA\n");
    }

    #[test]
    fn test_write_chunk_framing() {
        let mut out = Vec::new();
        assert_eq!(write_chunk(&mut out, &[b'x'; 26]).unwrap(), 26);
        assert_eq!(&out[..4], b"1a\r\n");
        assert!(out.ends_with(b"\r\n"));
    }
}
