use log::info;
use std::io::{self, BufRead, BufReader};
use std::net::{TcpListener, TcpStream, UdpSocket};

/// Largest datagram accepted on the CSI socket
pub const MAX_DATAGRAM: usize = 8192;

/// Blocking source of sample lines.
///
/// `Ok(None)` is end of stream; `Err` is a transport failure. Either one
/// ends the receiver that owns the source.
pub trait LineSource: Send {
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Newline-delimited byte stream.
///
/// A trailing fragment with no newline at end of stream is discarded.
pub struct StreamLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead + Send> StreamLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead + Send> LineSource for StreamLines<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf)?;
        if read == 0 || self.buf.last() != Some(&b'\n') {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

/// One sample per datagram. Datagram sockets have no end of stream.
pub struct DatagramLines {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl DatagramLines {
    pub fn new(socket: UdpSocket) -> Self {
        Self {
            socket,
            buf: vec![0; MAX_DATAGRAM],
        }
    }
}

impl LineSource for DatagramLines {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let (len, _) = self.socket.recv_from(&mut self.buf)?;
        Ok(Some(String::from_utf8_lossy(&self.buf[..len]).into_owned()))
    }
}

/// Block until one peer connects and wrap the connection as a line source
pub fn accept_one(listener: &TcpListener, feed: &str) -> io::Result<StreamLines<BufReader<TcpStream>>> {
    info!("[{}] Waiting for TCP connection on {}", feed, listener.local_addr()?);
    let (stream, peer) = listener.accept()?;
    info!("[{}] Connected from {}", feed, peer);
    Ok(StreamLines::new(BufReader::new(stream)))
}
