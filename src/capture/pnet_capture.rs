//! pnet-based link handle implementation.

use std::io;
use std::time::Duration;

use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};

use super::LinkHandle;
use crate::error::CaptureError;

/// Large enough for any frame the kernel hands to a packet socket.
const FRAME_BUFFER_SIZE: usize = 65536;

/// Ethernet channel bound to a single interface using the pnet library.
pub struct PnetHandle {
    interface: NetworkInterface,
    tx: Box<dyn DataLinkSender>,
    rx: Box<dyn DataLinkReceiver>,
}

impl PnetHandle {
    /// Open a capture/transmit channel on the named interface.
    ///
    /// Each receive waits at most `poll_interval`.
    pub fn open(interface_name: &str, poll_interval: Duration) -> Result<Self, CaptureError> {
        let interface = datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == interface_name)
            .ok_or_else(|| CaptureError::InterfaceNotFound(interface_name.to_string()))?;

        Self::open_interface(interface, poll_interval)
    }

    /// Open a channel on the first suitable interface.
    ///
    /// Looks for an interface that is up, not a loopback, and has an address.
    pub fn open_default(poll_interval: Duration) -> Result<Self, CaptureError> {
        let interface = datalink::interfaces()
            .into_iter()
            .find(|iface| iface.is_up() && !iface.is_loopback() && !iface.ips.is_empty())
            .ok_or_else(|| {
                CaptureError::InterfaceNotFound("no suitable interface found".to_string())
            })?;

        Self::open_interface(interface, poll_interval)
    }

    fn open_interface(
        interface: NetworkInterface,
        poll_interval: Duration,
    ) -> Result<Self, CaptureError> {
        let config = Config {
            read_timeout: Some(poll_interval),
            read_buffer_size: FRAME_BUFFER_SIZE,
            write_buffer_size: FRAME_BUFFER_SIZE,
            ..Config::default()
        };

        let (tx, rx) = match datalink::channel(&interface, config) {
            Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => {
                return Err(CaptureError::ChannelCreation(
                    "unsupported channel type".to_string(),
                ))
            }
            Err(e) => {
                let msg = e.to_string();
                if e.kind() == io::ErrorKind::PermissionDenied
                    || msg.contains("permission")
                    || msg.contains("Operation not permitted")
                {
                    return Err(CaptureError::InsufficientPermissions);
                }
                return Err(CaptureError::ChannelCreation(msg));
            }
        };

        tracing::info!("Opened datalink channel on {}", interface.name);

        Ok(Self { interface, tx, rx })
    }

    /// List all available network interfaces.
    pub fn list_interfaces() -> Vec<String> {
        datalink::interfaces()
            .into_iter()
            .map(|iface| {
                let status = if iface.is_up() { "UP" } else { "DOWN" };
                let ips: Vec<_> = iface.ips.iter().map(|ip| ip.to_string()).collect();
                format!(
                    "{}: {} [{}]",
                    iface.name,
                    status,
                    if ips.is_empty() {
                        "no IP".to_string()
                    } else {
                        ips.join(", ")
                    }
                )
            })
            .collect()
    }
}

impl LinkHandle for PnetHandle {
    fn interface_name(&self) -> &str {
        &self.interface.name
    }

    fn recv_frame(&mut self) -> io::Result<Option<Vec<u8>>> {
        match self.rx.next() {
            Ok(frame) => Ok(Some(frame.to_vec())),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn send_frame(&mut self, frame: &[u8]) -> io::Result<usize> {
        // pnet writes the whole frame or reports an error
        match self.tx.send_to(frame, None) {
            Some(Ok(())) => Ok(frame.len()),
            Some(Err(e)) => Err(e),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "datalink sender rejected the frame",
            )),
        }
    }
}

impl Drop for PnetHandle {
    fn drop(&mut self) {
        tracing::debug!("Releasing datalink channel on {}", self.interface.name);
    }
}
