//! Handshaked byte and string exchange over a serial stream.
//!
//! The link is the only channel between the two nodes. It is half-duplex and
//! lock-step: every application-level transfer is preceded by a readiness
//! handshake, and nothing is buffered, length-prefixed or checksummed.
//!
//! # Handshake
//!
//! ```text
//! sender                                receiver
//!   │                                       │ wait for SenderReady
//!   │ ── SenderReady (0x01) ──────────────► │
//!   │ wait for ReceiverReady                 │
//!   │ ◄────────────── ReceiverReady (0x02) ─ │
//!   │ ── payload ──────────────────────────► │
//! ```
//!
//! Bytes that are not the awaited token are discarded (and logged at
//! `trace`). The sender never writes the payload before it has read
//! `ReceiverReady`.
//!
//! # Blocking
//!
//! By default every wait is unbounded: a silent peer blocks forever. Setting
//! [`LinkConfig::handshake_timeout_ms`] bounds the waits inside an exchange
//! that has already started: the sender waiting for `ReceiverReady`, and the
//! receiver waiting for the payload after it answered. An expiry becomes
//! [`Error::HandshakeTimeout`]. Waiting for the peer to open an exchange is
//! never bounded, since on the other end a person may still be typing.
//! A closed stream always surfaces as [`Error::LinkClosed`].
//!
//! # Example
//!
//! ```
//! use doorlock_core::Command;
//! use doorlock_protocol::SerialLink;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> doorlock_core::Result<()> {
//! let (a, b) = tokio::io::duplex(64);
//! let mut interface = SerialLink::new(a);
//! let mut guard = SerialLink::new(b);
//!
//! let (sent, received) = tokio::join!(
//!     interface.send_command(Command::OpenDoor),
//!     guard.receive_command(),
//! );
//! sent?;
//! assert_eq!(received?, Command::OpenDoor);
//! # Ok(())
//! # }
//! ```

use doorlock_core::{
    Command, Credential, Error, HandshakeToken, LinkConfig, PasswordStatus, Result,
    constants::{CREDENTIAL_TERMINATOR, MAX_STRING_LENGTH},
};
use std::future::Future;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace, warn};

/// What the guard received while waiting for a credential to verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incoming {
    /// A complete credential, after a normal handshake.
    Credential(Credential),
    /// An alarm command byte arrived in place of `SenderReady`.
    Alarm,
}

/// One end of the serial cable.
///
/// Generic over any async byte stream: a `tokio::io::DuplexStream` in tests
/// and the simulator, a `TcpStream` between two processes.
#[derive(Debug)]
pub struct SerialLink<S> {
    stream: S,
    config: LinkConfig,
}

impl<S> SerialLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a stream with the default configuration (unbounded waits).
    pub fn new(stream: S) -> Self {
        Self::with_config(stream, LinkConfig::default())
    }

    pub fn with_config(stream: S, config: LinkConfig) -> Self {
        debug!(
            handshake_timeout_ms = ?config.handshake_timeout_ms,
            "Serial link opened"
        );
        Self { stream, config }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Give back the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    // ------------------------------------------------------------------------
    // Raw transfers
    // ------------------------------------------------------------------------

    /// Write a single byte, without handshake.
    pub async fn send_byte(&mut self, byte: u8) -> Result<()> {
        trace!(byte, "tx");
        self.write_frame(&[byte]).await
    }

    /// Read a single byte, without handshake. Blocks until one arrives.
    pub async fn receive_byte(&mut self) -> Result<u8> {
        let byte = read_byte(&mut self.stream).await?;
        trace!(byte, "rx");
        Ok(byte)
    }

    /// Write `payload` followed by the string terminator, without handshake.
    ///
    /// # Errors
    /// Returns `Error::UnterminatedString` if the payload does not fit in a
    /// transmitted string, and `Error::InvalidCredential` if it contains the
    /// terminator itself.
    pub async fn send_string(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() >= MAX_STRING_LENGTH {
            return Err(Error::UnterminatedString {
                max: MAX_STRING_LENGTH,
            });
        }
        if payload.contains(&CREDENTIAL_TERMINATOR) {
            return Err(Error::InvalidCredential(
                "payload contains the string terminator".to_string(),
            ));
        }

        let mut frame = Vec::with_capacity(payload.len() + 1);
        frame.extend_from_slice(payload);
        frame.push(CREDENTIAL_TERMINATOR);

        trace!(len = frame.len(), "tx string");
        self.write_frame(&frame).await
    }

    async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.stream.write_all(frame).await.map_err(link_error)?;
        self.stream.flush().await.map_err(link_error)
    }

    /// Read bytes until the terminator, without handshake.
    ///
    /// Returns the payload without the terminator.
    ///
    /// # Errors
    /// Returns `Error::UnterminatedString` if [`MAX_STRING_LENGTH`] bytes
    /// arrive without a terminator.
    pub async fn receive_string(&mut self) -> Result<Vec<u8>> {
        let mut payload = Vec::with_capacity(MAX_STRING_LENGTH);

        for _ in 0..MAX_STRING_LENGTH {
            let byte = read_byte(&mut self.stream).await?;
            if byte == CREDENTIAL_TERMINATOR {
                trace!(len = payload.len(), "rx string");
                return Ok(payload);
            }
            payload.push(byte);
        }

        warn!(max = MAX_STRING_LENGTH, "String terminator missing");
        Err(Error::UnterminatedString {
            max: MAX_STRING_LENGTH,
        })
    }

    // ------------------------------------------------------------------------
    // Handshake
    // ------------------------------------------------------------------------

    /// Sender side: signal `SenderReady`, then wait for `ReceiverReady`.
    ///
    /// The wait for `ReceiverReady` honors the configured bound.
    pub async fn announce(&mut self) -> Result<()> {
        self.send_byte(HandshakeToken::SenderReady.to_u8()).await?;

        let limit = self.config.handshake_timeout();
        let reply = read_until(&mut self.stream, "receiver ready", |byte| {
            matches!(HandshakeToken::from_u8(byte), Ok(HandshakeToken::ReceiverReady)).then_some(())
        });
        within(limit, "receiver ready", reply).await?;

        trace!("Handshake complete (sender)");
        Ok(())
    }

    /// Receiver side: wait for `SenderReady`, then signal `ReceiverReady`.
    ///
    /// Waiting for `SenderReady` is never bounded.
    pub async fn accept(&mut self) -> Result<()> {
        read_until(&mut self.stream, "sender ready", |byte| {
            matches!(HandshakeToken::from_u8(byte), Ok(HandshakeToken::SenderReady)).then_some(())
        })
        .await?;
        self.answer().await
    }

    async fn answer(&mut self) -> Result<()> {
        self.send_byte(HandshakeToken::ReceiverReady.to_u8()).await?;
        trace!("Handshake complete (receiver)");
        Ok(())
    }

    /// Payload byte following a completed handshake.
    async fn payload_byte(&mut self, awaiting: &'static str) -> Result<u8> {
        let limit = self.config.handshake_timeout();
        within(limit, awaiting, self.receive_byte()).await
    }

    // ------------------------------------------------------------------------
    // Handshaked payloads
    // ------------------------------------------------------------------------

    /// Transmit a credential (digits + terminator) after a handshake.
    pub async fn send_credential(&mut self, credential: &Credential) -> Result<()> {
        self.announce().await?;
        let wire = credential.to_wire();
        trace!(len = wire.len(), "tx credential");
        self.write_frame(&wire).await?;
        debug!(%credential, "Credential sent");
        Ok(())
    }

    /// Receive a credential after a handshake.
    pub async fn receive_credential(&mut self) -> Result<Credential> {
        self.accept().await?;
        self.read_credential().await
    }

    /// Receive a credential, or an alarm sent in place of `SenderReady`.
    ///
    /// An alarm byte short-circuits the transfer: no `ReceiverReady` is sent
    /// and no payload is read.
    pub async fn receive_credential_or_alarm(&mut self) -> Result<Incoming> {
        let opening = read_until(&mut self.stream, "sender ready or alarm", |byte| {
            match (HandshakeToken::from_u8(byte), Command::from_u8(byte)) {
                (Ok(HandshakeToken::SenderReady), _) => Some(Opening::Transfer),
                (_, Ok(Command::Alarm)) => Some(Opening::Alarm),
                _ => None,
            }
        })
        .await?;

        if opening == Opening::Alarm {
            debug!("Alarm received in place of credential");
            return Ok(Incoming::Alarm);
        }

        self.answer().await?;
        let credential = self.read_credential().await?;
        Ok(Incoming::Credential(credential))
    }

    async fn read_credential(&mut self) -> Result<Credential> {
        let limit = self.config.handshake_timeout();
        let payload = within(limit, "credential", self.receive_string()).await?;
        let credential = Credential::from_wire(&payload)?;
        debug!(%credential, "Credential received");
        Ok(credential)
    }

    /// Transmit a command byte after a handshake.
    pub async fn send_command(&mut self, command: Command) -> Result<()> {
        self.announce().await?;
        self.send_byte(command.to_u8()).await?;
        debug!(%command, "Command sent");
        Ok(())
    }

    /// Receive a command byte after a handshake.
    ///
    /// # Errors
    /// Returns `Error::UnknownWireByte` if the byte is not a known command.
    /// The handshake has completed by then, so the link stays in step.
    pub async fn receive_command(&mut self) -> Result<Command> {
        self.accept().await?;
        let byte = self.payload_byte("command").await?;
        let command = Command::from_u8(byte)?;
        debug!(%command, "Command received");
        Ok(command)
    }

    /// Transmit a match result after a handshake.
    pub async fn send_status(&mut self, status: PasswordStatus) -> Result<()> {
        self.announce().await?;
        self.send_byte(status.to_u8()).await?;
        debug!(%status, "Status sent");
        Ok(())
    }

    /// Receive a match result after a handshake.
    pub async fn receive_status(&mut self) -> Result<PasswordStatus> {
        self.accept().await?;
        let byte = self.payload_byte("status").await?;
        let status = PasswordStatus::from_u8(byte)?;
        debug!(%status, "Status received");
        Ok(status)
    }
}

async fn read_byte<R>(stream: &mut R) -> Result<u8>
where
    R: AsyncRead + Unpin,
{
    stream.read_u8().await.map_err(link_error)
}

/// How the guard's peer opened a verification exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opening {
    Transfer,
    Alarm,
}

/// Discard bytes until `decode` accepts one.
async fn read_until<R, T>(
    stream: &mut R,
    awaiting: &'static str,
    decode: impl Fn(u8) -> Option<T>,
) -> Result<T>
where
    R: AsyncRead + Unpin,
{
    loop {
        let byte = read_byte(stream).await?;
        if let Some(token) = decode(byte) {
            return Ok(token);
        }
        trace!(awaiting, byte, "Discarding byte");
    }
}

/// Run `wait` under the optional bound of an exchange in progress.
async fn within<T>(
    limit: Option<Duration>,
    awaiting: &'static str,
    wait: impl Future<Output = Result<T>>,
) -> Result<T> {
    let Some(limit) = limit else {
        return wait.await;
    };

    match tokio::time::timeout(limit, wait).await {
        Ok(result) => result,
        Err(_) => {
            let duration_ms = limit.as_millis() as u64;
            warn!(awaiting, duration_ms, "Handshake timeout");
            Err(Error::HandshakeTimeout { duration_ms })
        }
    }
}

/// A peer hanging up is reported as `LinkClosed`, anything else as I/O.
fn link_error(err: std::io::Error) -> Error {
    match err.kind() {
        ErrorKind::UnexpectedEof
        | ErrorKind::BrokenPipe
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted => Error::LinkClosed,
        _ => Error::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorlock_core::constants::{ALARM_COMMAND_BYTE, RECEIVER_READY_BYTE, SENDER_READY_BYTE};
    use rstest::rstest;
    use tokio::io::{DuplexStream, duplex};

    fn pair() -> (SerialLink<DuplexStream>, SerialLink<DuplexStream>) {
        let (a, b) = duplex(64);
        (SerialLink::new(a), SerialLink::new(b))
    }

    #[tokio::test]
    async fn test_raw_byte_exchange() {
        let (mut a, mut b) = pair();
        a.send_byte(0x42).await.unwrap();
        assert_eq!(b.receive_byte().await.unwrap(), 0x42);
    }

    #[tokio::test]
    async fn test_string_exchange() {
        let (mut a, mut b) = pair();
        a.send_string(b"12345").await.unwrap();
        assert_eq!(b.receive_string().await.unwrap(), b"12345");
    }

    #[rstest]
    #[case(b"123456".as_slice())]
    #[case(b"12#45".as_slice())]
    #[tokio::test]
    async fn test_send_string_rejects_bad_payload(#[case] payload: &[u8]) {
        let (mut a, _b) = pair();
        assert!(a.send_string(payload).await.is_err());
    }

    #[tokio::test]
    async fn test_receive_string_without_terminator() {
        let (a, b) = duplex(64);
        let mut raw = a;
        let mut link = SerialLink::new(b);

        raw.write_all(b"1234567").await.unwrap();
        let err = link.receive_string().await.unwrap_err();
        assert!(matches!(err, Error::UnterminatedString { max: 6 }));
    }

    #[tokio::test]
    async fn test_closed_peer_is_link_closed() {
        let (a, b) = duplex(64);
        drop(a);
        let mut link = SerialLink::new(b);

        assert!(matches!(
            link.receive_byte().await.unwrap_err(),
            Error::LinkClosed
        ));
        assert!(matches!(
            link.send_byte(0x01).await.unwrap_err(),
            Error::LinkClosed
        ));
    }

    #[tokio::test]
    async fn test_credential_exchange() {
        let (mut a, mut b) = pair();
        let credential: Credential = "24680".parse().unwrap();

        let (sent, received) = tokio::join!(a.send_credential(&credential), b.receive_credential());
        sent.unwrap();
        assert_eq!(received.unwrap(), credential);
    }

    #[tokio::test]
    async fn test_status_exchange() {
        let (mut guard, mut interface) = pair();

        for status in [PasswordStatus::Matching, PasswordStatus::Unmatching] {
            let (sent, received) =
                tokio::join!(guard.send_status(status), interface.receive_status());
            sent.unwrap();
            assert_eq!(received.unwrap(), status);
        }
    }

    #[tokio::test]
    async fn test_receiver_discards_noise_before_sender_ready() {
        let (a, b) = duplex(64);
        let mut raw = a;
        let mut guard = SerialLink::new(b);

        raw.write_all(&[0x55, 0x00, SENDER_READY_BYTE]).await.unwrap();
        let (command, ()) = tokio::join!(guard.receive_command(), async {
            assert_eq!(raw.read_u8().await.unwrap(), RECEIVER_READY_BYTE);
            raw.write_all(&[Command::ChangePassword.to_u8()]).await.unwrap();
        });
        assert_eq!(command.unwrap(), Command::ChangePassword);
    }

    #[tokio::test]
    async fn test_alarm_replaces_sender_ready() {
        let (a, b) = duplex(64);
        let mut raw = a;
        let mut guard = SerialLink::new(b);

        raw.write_all(&[ALARM_COMMAND_BYTE]).await.unwrap();
        assert_eq!(
            guard.receive_credential_or_alarm().await.unwrap(),
            Incoming::Alarm
        );

        // No ReceiverReady was sent back
        let pending = tokio::time::timeout(Duration::from_millis(10), raw.read_u8()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn test_unknown_command_byte() {
        let (mut a, mut b) = pair();
        let (sent, received) = tokio::join!(
            async {
                a.announce().await?;
                a.send_byte(0x7E).await
            },
            b.receive_command()
        );
        sent.unwrap();
        assert!(matches!(
            received.unwrap_err(),
            Error::UnknownWireByte { byte: 0x7E, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handshake_timeout() {
        let (a, _b) = duplex(64);
        let config = LinkConfig::default().with_handshake_timeout(Duration::from_millis(250));
        let mut link = SerialLink::with_config(a, config);

        let err = link.announce().await.unwrap_err();
        assert!(matches!(err, Error::HandshakeTimeout { duration_ms: 250 }));
    }

    fn bounded(stream: DuplexStream) -> SerialLink<DuplexStream> {
        let config = LinkConfig::default().with_handshake_timeout(Duration::from_millis(250));
        SerialLink::with_config(stream, config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_receiver_is_not_bounded() {
        let (a, b) = duplex(64);
        let mut raw = a;
        let mut guard = bounded(b);

        let peer = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            raw.write_all(&[SENDER_READY_BYTE]).await.unwrap();
            assert_eq!(raw.read_u8().await.unwrap(), RECEIVER_READY_BYTE);
            raw.write_all(&[Command::OpenDoor.to_u8()]).await.unwrap();
        };
        let (command, ()) = tokio::join!(guard.receive_command(), peer);
        assert_eq!(command.unwrap(), Command::OpenDoor);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_guard_still_accepts_alarm() {
        let (a, b) = duplex(64);
        let mut raw = a;
        let mut guard = bounded(b);

        let peer = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            raw.write_all(&[ALARM_COMMAND_BYTE]).await.unwrap();
        };
        let (incoming, ()) = tokio::join!(guard.receive_credential_or_alarm(), peer);
        assert_eq!(incoming.unwrap(), Incoming::Alarm);
    }

    #[rstest]
    #[case::command("command")]
    #[case::credential("credential")]
    #[tokio::test(start_paused = true)]
    async fn test_missing_payload_times_out(#[case] payload: &str) {
        let (a, b) = duplex(64);
        let mut raw = a;
        let mut guard = bounded(b);

        raw.write_all(&[SENDER_READY_BYTE]).await.unwrap();
        let err = match payload {
            "command" => guard.receive_command().await.map(|_| ()),
            _ => guard.receive_credential().await.map(|_| ()),
        }
        .unwrap_err();

        assert!(matches!(err, Error::HandshakeTimeout { duration_ms: 250 }));
        assert_eq!(raw.read_u8().await.unwrap(), RECEIVER_READY_BYTE);
    }

    #[tokio::test]
    async fn test_credential_frame_on_the_wire() {
        let (a, b) = duplex(64);
        let mut interface = SerialLink::new(a);
        let mut raw = b;
        let credential: Credential = "24680".parse().unwrap();

        let peer = async {
            assert_eq!(
                HandshakeToken::from_u8(raw.read_u8().await.unwrap()).unwrap(),
                HandshakeToken::SenderReady
            );
            raw.write_all(&[HandshakeToken::ReceiverReady.to_u8()])
                .await
                .unwrap();
            let mut frame = [0u8; MAX_STRING_LENGTH];
            raw.read_exact(&mut frame).await.unwrap();
            frame
        };
        let (sent, frame) = tokio::join!(interface.send_credential(&credential), peer);

        sent.unwrap();
        assert_eq!(&frame, b"24680#");
    }
}
