#![allow(dead_code)]

use std::sync::Arc;

use kvcntl::cntl::{
    ConfigOrigin, DetachedEngine, HandleType, Instance, ServerNode, SocketDescriptor, SocketInfo,
    VbucketMap,
};

/// Maps every key to `vbucket`, owned by `server`.
pub struct FixedMap {
    pub vbucket: u16,
    pub server: i32,
}

impl VbucketMap for FixedMap {
    fn map_key(&self, _key: &[u8]) -> (u16, i32) {
        (self.vbucket, self.server)
    }
}

pub struct FakeServer {
    pub port: u16,
    pub mutation_tokens: bool,
}

impl ServerNode for FakeServer {
    fn supports_mutation_tokens(&self) -> bool {
        self.mutation_tokens
    }

    fn socket(&self) -> Option<SocketInfo> {
        Some(socket("10.0.0.1", self.port))
    }

    fn sasl_mech(&self) -> Option<String> {
        Some("SCRAM-SHA512".into())
    }
}

pub fn socket(host: &str, port: u16) -> SocketInfo {
    SocketInfo {
        host: host.into(),
        port,
        descriptor: SocketDescriptor::Fd(7),
    }
}

/// Detached engine that looks connected: a cluster map, two data nodes
/// (the second slot empty) and a REST connection from HTTP bootstrap.
pub fn connected_engine() -> DetachedEngine {
    let mut engine = DetachedEngine::new();
    engine.vbconfig = Some(Arc::new(FixedMap {
        vbucket: 42,
        server: 1,
    }));
    let first: Box<dyn ServerNode> = Box::new(FakeServer {
        port: 11210,
        mutation_tokens: true,
    });
    engine.servers = vec![Some(first), None];
    engine.rest = Some(socket("10.0.0.1", 8091));
    engine.origin = Some(ConfigOrigin::Http);
    engine
}

pub fn connected_instance() -> Instance {
    Instance::new(HandleType::Bucket, Box::new(connected_engine()))
}
