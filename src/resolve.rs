//! Batched hostname resolution, one name at a time or all at once.
//!
//! Both resolvers return one address list per input hostname, aligned by
//! position. They differ in how failures and latency compose:
//!
//!  - [`SequentialResolver`] looks names up in order and stops at the first
//!    failure; its latency is the sum of the individual lookups.
//!  - [`ConcurrentResolver`] starts a thread per name before waiting on any
//!    of them and joins every thread before returning, even when some have
//!    already failed; its latency is that of the slowest lookup.

use std::{
    io,
    net::{IpAddr, ToSocketAddrs},
    thread,
};

use tracing::{debug, warn};

use crate::{Error, Result};

pub type AddressList = Vec<IpAddr>;

/// The name-resolution primitive the resolvers are built on.
pub trait Lookup: Sync {
    fn lookup(&self, hostname: &str) -> io::Result<AddressList>;
}

impl<L: Lookup + ?Sized> Lookup for &L {
    fn lookup(&self, hostname: &str) -> io::Result<AddressList> {
        (**self).lookup(hostname)
    }
}

/// Asks the operating system (`getaddrinfo`), so `/etc/hosts` and IP
/// literals are honoured alongside DNS.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLookup;

impl Lookup for SystemLookup {
    fn lookup(&self, hostname: &str) -> io::Result<AddressList> {
        let mut addrs = AddressList::new();
        // `getaddrinfo` hands back one entry per socket type; keep each
        // address once, in the order the system returned them.
        for sock in (hostname, 0).to_socket_addrs()? {
            if !addrs.contains(&sock.ip()) {
                addrs.push(sock.ip());
            }
        }

        if addrs.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no addresses returned",
            ));
        }

        Ok(addrs)
    }
}

pub trait Resolver {
    /// Resolves every hostname, returning the address lists in input order.
    fn resolve<S: AsRef<str>>(&self, hostnames: &[S]) -> Result<Vec<AddressList>>;
}

fn lookup_one<L: Lookup + ?Sized>(lookup: &L, hostname: &str) -> Result<AddressList> {
    debug!(hostname, "resolving");
    match lookup.lookup(hostname) {
        Ok(addrs) => {
            debug!(hostname, count = addrs.len(), "resolved");
            Ok(addrs)
        }
        Err(e) => {
            warn!(hostname, error = %e, "lookup failed");
            Err(Error::resolution(hostname, e))
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct SequentialResolver<L = SystemLookup> {
    lookup: L,
}

impl<L: Lookup> SequentialResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }
}

impl<L: Lookup> Resolver for SequentialResolver<L> {
    fn resolve<S: AsRef<str>>(&self, hostnames: &[S]) -> Result<Vec<AddressList>> {
        // `collect` into a `Result` stops at the first `Err`.
        hostnames
            .iter()
            .map(|h| lookup_one(&self.lookup, h.as_ref()))
            .collect()
    }
}

/// One thread per hostname, no cap.
///
/// Fine for the handful of names a benchmark batch holds; larger batches
/// want a bounded pool instead.
#[derive(Debug, Default, Clone)]
pub struct ConcurrentResolver<L = SystemLookup> {
    lookup: L,
}

impl<L: Lookup> ConcurrentResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }
}

impl<L: Lookup> Resolver for ConcurrentResolver<L> {
    fn resolve<S: AsRef<str>>(&self, hostnames: &[S]) -> Result<Vec<AddressList>> {
        let lookup = &self.lookup;

        let outcomes: Vec<Result<AddressList>> = thread::scope(|s| {
            // Spawn everything first...
            let handles: Vec<_> = hostnames
                .iter()
                .enumerate()
                .map(|(idx, h)| {
                    let hostname = h.as_ref();
                    let handle = thread::Builder::new()
                        .name(format!("resolve-{idx}"))
                        .spawn_scoped(s, move || lookup_one(lookup, hostname));

                    (hostname, handle)
                })
                .collect();

            // ...then wait on all of it, failures included.
            handles
                .into_iter()
                .map(|(hostname, handle)| match handle {
                    Ok(handle) => handle.join().unwrap_or_else(|_| {
                        warn!(hostname, "lookup thread panicked");
                        Err(Error::LookupPanicked {
                            hostname: hostname.to_owned(),
                        })
                    }),
                    Err(e) => Err(Error::resolution(hostname, e)),
                })
                .collect()
        });

        // Every thread has been joined by now; report the first failure by
        // input position, if any.
        outcomes.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{
        collections::HashMap,
        net::Ipv4Addr,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Barrier,
        },
        time::{Duration, Instant},
    };

    enum Answer {
        Addr(u8),
        Fail,
        Panic,
    }

    /// Canned answers with a per-name delay; counts calls and completions.
    #[derive(Default)]
    struct Stub {
        table: HashMap<&'static str, (u64, Answer)>,
        barrier: Option<Barrier>,
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl Stub {
        fn with(mut self, name: &'static str, delay_ms: u64, answer: Answer) -> Self {
            self.table.insert(name, (delay_ms, answer));
            self
        }
    }

    impl Lookup for Stub {
        fn lookup(&self, hostname: &str) -> io::Result<AddressList> {
            self.started.fetch_add(1, Ordering::SeqCst);
            if let Some(b) = &self.barrier {
                b.wait();
            }

            let (delay, answer) = &self.table[hostname];
            thread::sleep(Duration::from_millis(*delay));
            self.finished.fetch_add(1, Ordering::SeqCst);

            match answer {
                Answer::Addr(last) => Ok(vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, *last))]),
                Answer::Fail => Err(io::Error::new(io::ErrorKind::NotFound, "no such host")),
                Answer::Panic => panic!("lookup blew up"),
            }
        }
    }

    fn ip(last: u8) -> AddressList {
        vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))]
    }

    #[test]
    fn empty_batch() {
        let hosts: [&str; 0] = [];
        assert!(SequentialResolver::new(Stub::default()).resolve(&hosts).unwrap().is_empty());
        assert!(ConcurrentResolver::new(Stub::default()).resolve(&hosts).unwrap().is_empty());
    }

    #[test]
    fn results_follow_input_order() {
        // Later names answer first, so completion order is reversed.
        let stub = Stub::default()
            .with("a", 60, Answer::Addr(1))
            .with("b", 30, Answer::Addr(2))
            .with("c", 0, Answer::Addr(3));
        let hosts = ["a", "b", "c", "a"];

        let seq = SequentialResolver::new(&stub).resolve(&hosts).unwrap();
        let con = ConcurrentResolver::new(&stub).resolve(&hosts).unwrap();

        assert_eq!(seq, vec![ip(1), ip(2), ip(3), ip(1)]);
        assert_eq!(seq, con);
    }

    #[test]
    fn concurrent_starts_every_lookup_before_waiting() {
        // Each lookup blocks until all four are in flight at once; anything
        // less than full fan-out would hang here.
        let mut stub = Stub::default()
            .with("a", 0, Answer::Addr(1))
            .with("b", 0, Answer::Addr(2))
            .with("c", 0, Answer::Addr(3))
            .with("d", 0, Answer::Addr(4));
        stub.barrier = Some(Barrier::new(4));

        let res = ConcurrentResolver::new(&stub).resolve(&["a", "b", "c", "d"]).unwrap();
        assert_eq!(res, vec![ip(1), ip(2), ip(3), ip(4)]);
    }

    #[test]
    fn concurrent_latency_is_bounded_by_slowest_lookup() {
        let stub = Stub::default()
            .with("a", 100, Answer::Addr(1))
            .with("b", 100, Answer::Addr(2))
            .with("c", 100, Answer::Addr(3))
            .with("d", 100, Answer::Addr(4));
        let hosts = ["a", "b", "c", "d"];

        let start = Instant::now();
        SequentialResolver::new(&stub).resolve(&hosts).unwrap();
        let sequential = start.elapsed();

        let start = Instant::now();
        ConcurrentResolver::new(&stub).resolve(&hosts).unwrap();
        let concurrent = start.elapsed();

        assert!(sequential >= Duration::from_millis(400), "{sequential:?}");
        assert!(concurrent < sequential, "{concurrent:?} vs {sequential:?}");
    }

    #[test]
    fn sequential_fails_fast() {
        let stub = Stub::default()
            .with("good", 0, Answer::Addr(1))
            .with("bad", 0, Answer::Fail);

        let err = SequentialResolver::new(&stub)
            .resolve(&["good", "bad", "good", "good"])
            .unwrap_err();

        assert!(matches!(&err, Error::Resolution { hostname, .. } if hostname == "bad"));
        assert_eq!(stub.started.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_waits_for_every_lookup_before_failing() {
        let stub = Stub::default()
            .with("slow", 150, Answer::Addr(1))
            .with("bad", 0, Answer::Fail);

        let err = ConcurrentResolver::new(&stub)
            .resolve(&["slow", "bad", "slow"])
            .unwrap_err();

        assert!(matches!(&err, Error::Resolution { hostname, .. } if hostname == "bad"));
        assert_eq!(stub.started.load(Ordering::SeqCst), 3);
        assert_eq!(stub.finished.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn concurrent_reports_lowest_positioned_failure() {
        let stub = Stub::default()
            .with("first-bad", 80, Answer::Fail)
            .with("good", 0, Answer::Addr(1))
            .with("later-bad", 0, Answer::Fail);

        let err = ConcurrentResolver::new(&stub)
            .resolve(&["first-bad", "good", "later-bad"])
            .unwrap_err();

        assert!(matches!(&err, Error::Resolution { hostname, .. } if hostname == "first-bad"));
    }

    #[test]
    fn concurrent_surfaces_panicking_lookup() {
        let stub = Stub::default()
            .with("good", 20, Answer::Addr(1))
            .with("boom", 0, Answer::Panic);

        let err = ConcurrentResolver::new(&stub)
            .resolve(&["good", "boom"])
            .unwrap_err();

        assert!(matches!(&err, Error::LookupPanicked { hostname } if hostname == "boom"));
        assert_eq!(stub.finished.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn system_lookup_handles_literals() {
        let res = SystemLookup.lookup("127.0.0.1").unwrap();
        assert_eq!(res, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);

        let res = SystemLookup.lookup("::1").unwrap();
        assert_eq!(res, vec![IpAddr::V6(std::net::Ipv6Addr::LOCALHOST)]);
    }

    #[test]
    fn system_lookup_resolves_localhost() {
        let res = SystemLookup.lookup("localhost").unwrap();
        assert!(!res.is_empty());
        assert!(res.iter().all(IpAddr::is_loopback), "{res:?}");
    }
}
