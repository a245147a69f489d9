use std::fs;
use std::sync::{Arc, Mutex};

use kvcntl::cntl::legacy;
use kvcntl::cntl::{
    CntlValue, ConfigTransport, DetachedEngine, HandleType, Instance, Ipv6Policy, Mode, Opcode,
    ProviderKind, ServerInfoQuery, VbMapQuery, control, control_string, get_u32,
};
use kvcntl::config::LoggingConfig;
use kvcntl::telemetry::{self, LogForwarder, LogRecord, Logger, TelemetryConfig};

use crate::fixtures::cluster::connected_instance;

fn get(instance: &mut Instance, opcode: Opcode, seed: CntlValue) -> CntlValue {
    let mut value = seed;
    control(instance, Mode::Get, opcode, &mut value).expect("get");
    value
}

fn detailed(instance: &mut Instance) {
    control_string(instance, "detailed_errcodes", "1").expect("detailed");
}

#[test]
fn vbmap_needs_a_cluster_map() {
    let mut instance = Instance::detached();
    let err = control(
        &mut instance,
        Mode::Get,
        Opcode::VBMAP,
        &mut CntlValue::VbMap(VbMapQuery::new("key")),
    )
    .unwrap_err();
    assert_eq!(err.code(), "temporary_failure");

    let mut instance = connected_instance();
    let CntlValue::VbMap(query) = get(
        &mut instance,
        Opcode::VBMAP,
        CntlValue::VbMap(VbMapQuery::new("key")),
    ) else {
        panic!("expected vbmap payload");
    };
    assert_eq!((query.vbucket, query.server_index), (42, 1));
}

#[test]
fn server_info_by_index() {
    let mut instance = connected_instance();

    let CntlValue::ServerInfo(info) = get(
        &mut instance,
        Opcode::MEMDNODE_INFO,
        CntlValue::ServerInfo(ServerInfoQuery::v1(0)),
    ) else {
        panic!("expected server info");
    };
    assert!(info.connected);
    assert_eq!(info.socket.as_ref().map(|s| s.port), Some(11210));
    assert_eq!(info.sasl_mech.as_deref(), Some("SCRAM-SHA512"));

    detailed(&mut instance);
    // Slot 1 is empty; index == count names no server at all.
    for index in [1, 2] {
        let err = control(
            &mut instance,
            Mode::Get,
            Opcode::MEMDNODE_INFO,
            &mut CntlValue::ServerInfo(ServerInfoQuery::v0(index)),
        )
        .unwrap_err();
        assert_eq!(err.code(), "network_error", "{index}");
    }
    let err = control(
        &mut instance,
        Mode::Get,
        Opcode::MEMDNODE_INFO,
        &mut CntlValue::ServerInfo(ServerInfoQuery::v0(3)),
    )
    .unwrap_err();
    assert_eq!(err.code(), "bad_argument");

    let CntlValue::ServerInfo(rest) = get(
        &mut instance,
        Opcode::CONFIGNODE_INFO,
        CntlValue::ServerInfo(ServerInfoQuery::v0(0)),
    ) else {
        panic!("expected server info");
    };
    assert_eq!(rest.socket.map(|s| s.port), Some(8091));
}

#[test]
fn engine_backed_getters() {
    let mut instance = connected_instance();
    assert_eq!(
        get(&mut instance, Opcode::CONFIG_TRANSPORT, CntlValue::Empty),
        CntlValue::Transport(ConfigTransport::Http)
    );
    assert_eq!(
        get(&mut instance, Opcode::IOPS, CntlValue::Empty),
        CntlValue::text("detached")
    );
    assert_eq!(
        get(&mut instance, Opcode::MUTATION_TOKENS_SUPPORTED, CntlValue::Empty),
        CntlValue::Int(1)
    );
    assert_eq!(
        get(&mut instance, Opcode::HANDLETYPE, CntlValue::Empty),
        CntlValue::HandleType(HandleType::Bucket)
    );
    assert!(matches!(
        get(&mut instance, Opcode::CHANGESET, CntlValue::Empty),
        CntlValue::Str(Some(_))
    ));

    let mut fresh = Instance::detached();
    let err = control(
        &mut fresh,
        Mode::Get,
        Opcode::CONFIG_TRANSPORT,
        &mut CntlValue::Empty,
    )
    .unwrap_err();
    assert_eq!(err.code(), "temporary_failure");
}

#[test]
fn node_lists_reach_providers() {
    let mut instance = Instance::detached();
    control(
        &mut instance,
        Mode::Set,
        Opcode::CONFIG_HTTP_NODES,
        &mut CntlValue::text("db1;db2:9000"),
    )
    .expect("http nodes");
    control(
        &mut instance,
        Mode::Set,
        Opcode::CONFIG_CCCP_NODES,
        &mut CntlValue::text("db1"),
    )
    .expect("cccp nodes");

    let engine = instance.engine_as::<DetachedEngine>().unwrap();
    assert_eq!(
        engine.provider(ProviderKind::Http).unwrap().nodes,
        vec!["db1:8091", "db2:9000"]
    );
    assert_eq!(
        engine.provider(ProviderKind::Cccp).unwrap().nodes,
        vec!["db1:11210"]
    );

    let err = control(
        &mut instance,
        Mode::Set,
        Opcode::CONFIG_HTTP_NODES,
        &mut CntlValue::text("db1:http"),
    )
    .unwrap_err();
    assert_eq!(err.code(), "invalid_host_format");
}

#[test]
fn config_cache_shortens_stream_idle() {
    let mut instance = Instance::detached();
    assert_eq!(instance.settings().http_stream_idle, u32::MAX);
    control_string(&mut instance, "config_cache_ro", "/tmp/kvc-cache.json").expect("cache");

    assert_eq!(instance.settings().http_stream_idle, 10_000_000);
    let engine = instance.engine_as::<DetachedEngine>().unwrap();
    let file = engine.provider(ProviderKind::File).unwrap();
    assert_eq!(file.filename.as_deref(), Some("/tmp/kvc-cache.json"));
    assert!(file.readonly);
}

#[test]
fn raw_string_keys_reach_their_handlers() {
    let mut instance = Instance::detached();
    control_string(&mut instance, "_reinit_connstr", "couchbase://db9/travel").expect("reinit");
    control_string(&mut instance, "bucket_cred", r#"["travel", "s3cret"]"#).expect("cred");

    assert_eq!(
        instance.settings().auth.bucket_password("travel"),
        Some("s3cret")
    );
    let engine = instance.engine_as::<DetachedEngine>().unwrap();
    assert_eq!(engine.connstr.as_deref(), Some("couchbase://db9/travel"));

    let err = control_string(&mut instance, "bucket_cred", r#"["only-one"]"#).unwrap_err();
    assert_eq!(err.code(), "invalid_argument");
}

#[test]
fn console_log_file_receives_tracing_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("console.log");

    // The only test in this binary that installs the global subscriber.
    let forwarder = LogForwarder::new();
    let logging = LoggingConfig {
        stdout: false,
        filter: Some("trace".into()),
        ..LoggingConfig::default()
    };
    let _guard = telemetry::init(TelemetryConfig::new(0, logging).with_forwarder(forwarder.clone()));

    let mut instance = Instance::detached();
    control_string(&mut instance, "console_log_file", path.to_str().unwrap()).expect("file");
    control_string(&mut instance, "console_log_level", "4").expect("level");
    forwarder.install(instance.settings().logger.clone());
    assert!(forwarder.is_installed());

    assert_eq!(get_u32(&mut instance, Opcode(0x7f)), 0);
    tracing::error!(target: "kvcntl::it", "hello");

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("get_u32 failed; reporting 0"), "{written}");
    assert!(written.contains("[ERROR] (kvcntl::it) hello"), "{written}");
}

#[derive(Default)]
struct Recording(Mutex<Vec<String>>);

impl Logger for Recording {
    fn log(&self, record: LogRecord) {
        self.0
            .lock()
            .unwrap()
            .push(record.message.unwrap_or_default());
    }
}

#[test]
fn installed_logger_is_not_replaced_by_console_level() {
    let mut instance = Instance::detached();
    let recording: Arc<dyn Logger> = Arc::new(Recording::default());
    control(
        &mut instance,
        Mode::Set,
        Opcode::LOGGER,
        &mut CntlValue::Logger(Some(Arc::clone(&recording))),
    )
    .expect("logger");
    control_string(&mut instance, "console_log_level", "3").expect("level");

    assert_eq!(
        get(&mut instance, Opcode::LOGGER, CntlValue::Empty),
        CntlValue::Logger(Some(recording))
    );
}

#[test]
fn pool_size_and_query_cache_go_to_the_engine() {
    let mut instance = Instance::detached();
    control_string(&mut instance, "http_poolsize", "0").expect("poolsize");
    control(
        &mut instance,
        Mode::Set,
        Opcode::N1QL_CLEARCACHE,
        &mut CntlValue::Empty,
    )
    .expect("clear cache");

    let engine = instance.engine_as::<DetachedEngine>().unwrap();
    assert_eq!(engine.http_pool_max_idle, 0);
    assert_eq!(engine.query_cache_clears, 1);
}

#[test]
#[allow(deprecated)]
fn legacy_accessors_share_the_table() {
    let mut instance = Instance::detached();
    legacy::set_ipv6(&mut instance, Ipv6Policy::Only).unwrap();
    legacy::set_timeout(&mut instance, 9).unwrap();
    assert_eq!(legacy::get_ipv6(&mut instance), Ipv6Policy::Only);
    assert_eq!(legacy::get_timeout(&mut instance), 9);
    assert_eq!(instance.settings().operation_timeout, 9);
}
