use super::{ADBTransportMessage, MessageCommand};
use crate::{ADBError, ADBMessageTransport, Result};

/// One logical stream, bound to a `(local_id, remote_id)` pair for its whole life.
///
/// Only one stream is open at a time: the session borrows the transport
/// exclusively until it is dropped.
#[derive(Debug)]
pub struct StreamSession<'a, T: ADBMessageTransport> {
    transport: &'a mut T,
    local_id: u32,
    remote_id: u32,
    closed: bool,
}

impl<'a, T: ADBMessageTransport> StreamSession<'a, T> {
    /// Send `OPEN` for `destination` (`shell:<command>`, `sync:`, `reboot:`) and
    /// wait for the device to accept it.
    pub fn open(transport: &'a mut T, local_id: u32, destination: &str) -> Result<Self> {
        let mut payload = destination.as_bytes().to_vec();
        payload.push(b'\0');
        transport.write_message(ADBTransportMessage::new(
            MessageCommand::Open,
            local_id,
            0,
            &payload,
        ))?;

        let response = transport.read_message()?;
        let header = response.header();
        if header.command() != MessageCommand::Okay {
            log::debug!("device answered OPEN {destination} with {}", header.command());
            return Err(ADBError::OpenRejected(destination.to_string()));
        }
        if header.arg1() != local_id {
            log::debug!(
                "device echoed local id {} instead of {local_id}",
                header.arg1()
            );
        }

        log::debug!(
            "opened stream {destination} (local {local_id}, remote {})",
            header.arg0()
        );
        Ok(Self {
            transport,
            local_id,
            remote_id: header.arg0(),
            closed: false,
        })
    }

    pub fn local_id(&self) -> u32 {
        self.local_id
    }

    pub fn remote_id(&self) -> u32 {
        self.remote_id
    }

    /// Whether our `CLSE` already went out.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn message(&self, command: MessageCommand, data: &[u8]) -> ADBTransportMessage {
        ADBTransportMessage::new(command, self.local_id, self.remote_id, data)
    }

    /// Send `data` in a `WRTE` and require the device to acknowledge it with `OKAY`.
    pub fn send_and_expect_okay(&mut self, data: &[u8]) -> Result<ADBTransportMessage> {
        let message = self.message(MessageCommand::Write, data);
        self.transport.write_message(message)?;

        let response = self.transport.read_message()?;
        match response.header().command() {
            MessageCommand::Okay => Ok(response),
            other => Err(ADBError::WrongResponseReceived(
                other.to_string(),
                MessageCommand::Okay.to_string(),
            )),
        }
    }

    /// Receive a message and acknowledge it with `OKAY` if it carries data.
    pub fn recv_and_reply_okay(&mut self) -> Result<ADBTransportMessage> {
        let message = self.transport.read_message()?;
        if message.header().command() == MessageCommand::Write {
            let okay = self.message(MessageCommand::Okay, &[]);
            self.transport.write_message(okay)?;
        }
        Ok(message)
    }

    /// Receive the next `WRTE`, acknowledged.
    pub fn recv_write(&mut self) -> Result<ADBTransportMessage> {
        let message = self.recv_and_reply_okay()?;
        match message.header().command() {
            MessageCommand::Write => Ok(message),
            other => Err(ADBError::WrongResponseReceived(
                other.to_string(),
                MessageCommand::Write.to_string(),
            )),
        }
    }

    /// Collect every `WRTE` payload until the device closes the stream.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        loop {
            let message = self.recv_and_reply_okay()?;
            match message.header().command() {
                MessageCommand::Write => output.extend_from_slice(message.payload()),
                MessageCommand::Clse => {
                    self.acknowledge_close()?;
                    return Ok(output);
                }
                other => log::debug!("ignoring {other} while reading stream output"),
            }
        }
    }

    /// Close from our side: send `CLSE` and wait for the device's `CLSE`.
    pub fn close(&mut self) -> Result<()> {
        let clse = self.message(MessageCommand::Clse, &[]);
        self.transport.write_message(clse)?;
        self.closed = true;

        loop {
            let message = self.transport.read_message()?;
            match message.header().command() {
                MessageCommand::Clse => return Ok(()),
                MessageCommand::Okay => log::debug!("discarding OKAY while closing stream"),
                MessageCommand::Write => {
                    log::debug!("discarding {} bytes while closing stream", message.payload().len());
                    let okay = self.message(MessageCommand::Okay, &[]);
                    self.transport.write_message(okay)?;
                }
                other => {
                    return Err(ADBError::WrongResponseReceived(
                        other.to_string(),
                        MessageCommand::Clse.to_string(),
                    ));
                }
            }
        }
    }

    /// Answer a `CLSE` the device sent first.
    pub fn acknowledge_close(&mut self) -> Result<()> {
        let clse = self.message(MessageCommand::Clse, &[]);
        self.transport.write_message(clse)?;
        self.closed = true;
        Ok(())
    }

    /// Best-effort `CLSE` after a failure; errors are only logged.
    pub(crate) fn abort(&mut self) {
        let clse = self.message(MessageCommand::Clse, &[]);
        if let Err(e) = self.transport.write_message(clse) {
            log::debug!("could not close stream {}: {e}", self.remote_id);
        }
        self.closed = true;
    }

    /// Leave the stream closed on both sides after `error` interrupted it.
    ///
    /// A timeout only gets a best-effort `CLSE`; after a transport failure
    /// nothing is sent. Otherwise the stream is closed and drained so the next
    /// `OPEN` sees a clean link.
    pub(crate) fn close_after_failure(&mut self, error: &ADBError) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        match error {
            ADBError::Timeout => {
                self.abort();
                Ok(())
            }
            e if e.is_transport_fatal() => Ok(()),
            _ => self.close(),
        }
    }
}
