use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::{MonitorError, Result};

const SIREN_TIMEOUT: Duration = Duration::from_secs(5);

/// One of the two commands the siren understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SirenCommand {
    On,
    Off,
}

impl SirenCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            SirenCommand::On => "SIREN_ON",
            SirenCommand::Off => "SIREN_OFF",
        }
    }
}

impl fmt::Display for SirenCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line-oriented driver for the siren device.
///
/// Per command: connect, write `{command}\n`, read one line, close. The
/// device must answer exactly `OK`; anything else leaves its physical
/// state unknown, which is a hard failure. The controller keeps no memory
/// of the last command, so callers re-assert the desired state every cycle.
pub struct SirenController {
    address: String,
}

impl SirenController {
    pub fn new(address: String) -> Self {
        Self { address }
    }

    pub async fn send(&self, command: SirenCommand) -> Result<()> {
        tokio::time::timeout(SIREN_TIMEOUT, self.exchange(command))
            .await
            .map_err(|_| {
                MonitorError::SirenProtocol(format!(
                    "siren at {} did not answer within {}s",
                    self.address,
                    SIREN_TIMEOUT.as_secs()
                ))
            })?
    }

    async fn exchange(&self, command: SirenCommand) -> Result<()> {
        let mut stream = TcpStream::connect(&self.address).await.map_err(|e| {
            MonitorError::SirenProtocol(format!("connect to siren {} failed: {e}", self.address))
        })?;

        stream
            .write_all(format!("{command}\n").as_bytes())
            .await
            .map_err(|e| MonitorError::SirenProtocol(format!("write to siren failed: {e}")))?;

        let mut reader = BufReader::new(&mut stream);
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| MonitorError::SirenProtocol(format!("read from siren failed: {e}")))?;

        if read == 0 {
            return Err(MonitorError::SirenProtocol(
                "siren closed the connection without answering".to_string(),
            ));
        }

        let answer = line.trim_end_matches(['\r', '\n']);
        if answer != "OK" {
            return Err(MonitorError::SirenProtocol(format!(
                "siren answered {answer:?} to {command}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// Fake siren: accepts connections, records each command line, answers
    /// with a fixed response. Returns the bound address and a channel of
    /// received commands.
    pub(crate) async fn spawn_fake_siren(
        response: &'static str,
    ) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let tx = tx.clone();
                tokio::spawn(async move {
                    let (read_half, mut write_half) = socket.split();
                    let mut line = String::new();
                    let mut reader = BufReader::new(read_half);
                    if reader.read_line(&mut line).await.is_ok() {
                        let _ = tx.send(line.trim_end().to_string());
                        let _ = write_half.write_all(response.as_bytes()).await;
                    }
                });
            }
        });

        (address, rx)
    }

    #[tokio::test]
    async fn test_ok_response_succeeds() {
        let (address, mut commands) = spawn_fake_siren("OK\n").await;
        let controller = SirenController::new(address);

        controller.send(SirenCommand::On).await.unwrap();
        assert_eq!(commands.recv().await.unwrap(), "SIREN_ON");

        controller.send(SirenCommand::Off).await.unwrap();
        assert_eq!(commands.recv().await.unwrap(), "SIREN_OFF");
    }

    #[tokio::test]
    async fn test_non_ok_response_is_protocol_error() {
        let (address, _commands) = spawn_fake_siren("FAIL\n").await;
        let controller = SirenController::new(address);

        let result = controller.send(SirenCommand::On).await;
        match result {
            Err(MonitorError::SirenProtocol(message)) => {
                assert!(message.contains("FAIL"), "unexpected message: {message}")
            }
            other => panic!("expected SirenProtocol error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_eof_without_answer_is_protocol_error() {
        let (address, _commands) = spawn_fake_siren("").await;
        let controller = SirenController::new(address);

        let result = controller.send(SirenCommand::Off).await;
        assert!(matches!(result, Err(MonitorError::SirenProtocol(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_protocol_error() {
        // Bind and drop to get an address nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let controller = SirenController::new(address);
        let result = controller.send(SirenCommand::Off).await;
        assert!(matches!(result, Err(MonitorError::SirenProtocol(_))));
    }
}
