//! TCP accept loop with one worker thread per connection.

use crate::error::{Result, ServerError};
use crate::handler::handle_connection;
use crate::ledger::SharedLedger;
use log::{debug, error, info, warn};
use std::io::BufReader;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

type Worker = JoinHandle<Result<()>>;

/// A bound listener and the ledger its connections share.
///
/// Every accepted connection is handed to its own named thread and the accept
/// loop immediately goes back to accepting. Worker handles are kept so their
/// outcome is always observed: [`Server::serve`] joins them, [`Server::run`]
/// reaps finished ones as it goes.
pub struct Server {
    listener: TcpListener,
    ledger: SharedLedger,
}

impl Server {
    /// Binds a listener on `addr` with a fresh, empty ledger.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        Self::with_ledger(addr, SharedLedger::new())
    }

    /// Binds a listener on `addr` that serves `ledger`.
    pub fn with_ledger(addr: SocketAddr, ledger: SharedLedger) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        Ok(Server { listener, ledger })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    /// Accepts connections until the process exits.
    ///
    /// Accept errors are logged and do not stop the loop.
    pub fn run(&self) -> Result<()> {
        info!("Listening on {}", self.local_addr()?);

        let mut workers: Vec<Worker> = Vec::new();
        for (id, stream) in self.listener.incoming().enumerate() {
            reap_finished(&mut workers);

            match stream {
                Ok(stream) => match self.spawn_worker(id, stream) {
                    Ok(worker) => workers.push(worker),
                    Err(e) => warn!("Could not start worker for connection {}: {}", id, e),
                },
                Err(e) => warn!("Accept failed: {}", e),
            }
        }

        Ok(())
    }

    /// Accepts exactly `connections` connections, then waits for all of them.
    ///
    /// Returns one result per connection, in accept order. If accepting or
    /// spawning fails, the workers already started are joined before the
    /// error is returned.
    pub fn serve(&self, connections: usize) -> Result<Vec<Result<()>>> {
        let mut workers = Vec::with_capacity(connections);
        for id in 0..connections {
            match self.accept_worker(id) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    warn!("Stopping after {} connections: {}", workers.len(), e);
                    for worker in workers {
                        let _ = join_worker(worker);
                    }
                    return Err(e);
                }
            }
        }

        Ok(workers.into_iter().map(join_worker).collect())
    }

    fn accept_worker(&self, id: usize) -> Result<Worker> {
        let (stream, _) = self.listener.accept()?;
        self.spawn_worker(id, stream)
    }

    fn spawn_worker(&self, id: usize, stream: TcpStream) -> Result<Worker> {
        let ledger = self.ledger.clone();
        let worker = thread::Builder::new()
            .name(format!("conn-{}", id))
            .spawn(move || serve_stream(stream, &ledger))?;
        Ok(worker)
    }
}

/// Runs one connection to completion. The socket closes when it is dropped.
fn serve_stream(stream: TcpStream, ledger: &SharedLedger) -> Result<()> {
    if let Ok(peer) = stream.peer_addr() {
        debug!("Accepted connection from {}", peer);
    }

    let reader = BufReader::new(stream.try_clone()?);
    handle_connection(reader, &stream, ledger)?;
    Ok(())
}

fn join_worker(worker: Worker) -> Result<()> {
    let name = worker.thread().name().unwrap_or("conn").to_string();
    let result = worker
        .join()
        .map_err(|_| ServerError::WorkerPanicked)
        .and_then(|result| result);

    match &result {
        Ok(()) => {}
        Err(ServerError::WorkerPanicked) => error!("{}: worker panicked", name),
        Err(e) => warn!("{}: {}", name, e),
    }
    result
}

fn reap_finished(workers: &mut Vec<Worker>) {
    let (finished, running): (Vec<_>, Vec<_>) =
        workers.drain(..).partition(|worker| worker.is_finished());
    *workers = running;

    for worker in finished {
        let _ = join_worker(worker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn local_server() -> Server {
        Server::bind("127.0.0.1:0".parse().unwrap()).unwrap()
    }

    #[test]
    fn test_bind_reports_local_addr() {
        let server = local_server();
        let addr = server.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn test_bind_conflict_is_bind_error() {
        let server = local_server();
        let addr = server.local_addr().unwrap();

        match Server::bind(addr) {
            Err(ServerError::Bind { addr: reported, .. }) => assert_eq!(reported, addr.to_string()),
            Err(other) => panic!("Expected Bind error, got {:?}", other),
            Ok(_) => panic!("Expected Bind error, got a second listener"),
        }
    }

    #[test]
    fn test_serve_single_connection() {
        let server = local_server();
        let addr = server.local_addr().unwrap();

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream
                .write_all(b"GET /bin/create&acct=bob&amount= HTTP/1.1\r\n\r\n")
                .unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).unwrap();
            response
        });

        let results = server.serve(1).unwrap();
        assert!(results[0].is_ok());

        let response = client.join().unwrap();
        assert!(response.ends_with("\r\n\r\nAccount bob created"));
        assert!(server.ledger().balance("bob").is_some());
    }

    #[test]
    fn test_disconnect_before_request_is_reported() {
        let server = local_server();
        let addr = server.local_addr().unwrap();

        let client = thread::spawn(move || drop(TcpStream::connect(addr).unwrap()));

        let results = server.serve(1).unwrap();
        client.join().unwrap();
        assert!(matches!(results[0], Err(ServerError::ConnectionClosed)));
    }

    #[test]
    fn test_serve_joins_started_workers_on_accept_error() {
        let server = local_server();
        let addr = server.local_addr().unwrap();

        let mut client = TcpStream::connect(addr).unwrap();
        client
            .write_all(b"GET /bin/create&acct=early HTTP/1.1\r\n\r\n")
            .unwrap();
        thread::sleep(std::time::Duration::from_millis(50));

        // The queued connection is accepted; the next accept fails with WouldBlock.
        server.listener.set_nonblocking(true).unwrap();
        match server.serve(2) {
            Err(ServerError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::WouldBlock),
            other => panic!("Expected WouldBlock, got {:?}", other),
        }

        // Joined before returning, so the request has already been applied.
        assert!(server.ledger().balance("early").is_some());

        let mut response = String::new();
        client.read_to_string(&mut response).unwrap();
        assert!(response.ends_with("\r\n\r\nAccount early created"));
    }
}
