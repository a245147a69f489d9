use kvcntl::cntl::strconv::{
    convert_compression, convert_intbool, convert_retrymode, convert_size, convert_timeout,
};
use kvcntl::cntl::{
    ALIASES, CntlValue, Compression, Instance, Opcode, RetryPolicy, RetryReason, control_string,
    resolve, retry, set_u32,
};

#[test]
fn timeout_text_truncates_to_micros() {
    assert_eq!(convert_timeout("2.5"), Ok(CntlValue::U32(2_500_000)));
    assert_eq!(convert_timeout("2.5000001"), Ok(CntlValue::U32(2_500_000)));
    assert_eq!(convert_timeout("0.0000019"), Ok(CntlValue::U32(1)));
    assert!(convert_timeout("soon").is_err());
    assert!(convert_timeout("-1").is_err());
}

#[test]
fn boolean_text() {
    let cases = [("true", 1), ("false", 0), ("7", 7), ("abc", 0), ("0", 0), ("-3", -3)];
    for (text, expected) in cases {
        assert_eq!(convert_intbool(text), Ok(CntlValue::Int(expected)), "{text}");
    }
}

#[test]
fn compression_by_prefix() {
    assert_eq!(
        convert_compression("inflate_only"),
        Ok(CntlValue::Int(Compression::IN.0))
    );
    assert_eq!(convert_compression("off"), Ok(CntlValue::Int(0)));
    assert_eq!(convert_compression("force"), Ok(CntlValue::Int(0x07)));
    assert!(convert_compression("maybe").is_err());
}

#[test]
fn size_rejects_negative() {
    assert_eq!(convert_size("12"), Ok(CntlValue::Size(12)));
    assert!(convert_size("-12").is_err());
}

#[test]
fn retry_text_packs_reason_and_policy() {
    assert_eq!(
        convert_retrymode("missingnode:safe"),
        Ok(CntlValue::U32(retry::encode(
            RetryReason::MissingNode,
            RetryPolicy::Safe
        )))
    );
    assert!(convert_retrymode("sockerr").is_err());
    assert!(convert_retrymode("sockerr:sometimes").is_err());
    assert!(convert_retrymode("cosmicray:all").is_err());
}

#[test]
fn timeout_key_matches_opcode_set() {
    let mut by_key = Instance::detached();
    control_string(&mut by_key, "timeout", "5").expect("string set");

    let mut by_opcode = Instance::detached();
    set_u32(&mut by_opcode, Opcode::OP_TIMEOUT, 5_000_000).expect("opcode set");

    assert_eq!(
        by_key.settings().operation_timeout,
        by_opcode.settings().operation_timeout
    );
    assert_eq!(by_key.settings().operation_timeout, 5_000_000);
}

#[test]
fn every_key_reaches_a_registered_opcode() {
    assert_eq!(ALIASES.len(), 37);
    for alias in ALIASES {
        assert!(kvcntl::cntl::exists(alias.opcode), "{}", alias.key);
        assert_eq!(resolve(alias.key).map(|a| a.opcode), Some(alias.opcode));
    }
}

#[test]
fn unknown_key_and_bad_text_are_coarsened() {
    let mut instance = Instance::detached();
    let err = control_string(&mut instance, "operation_timeout_ms", "5").unwrap_err();
    assert_eq!(err.code(), "not_supported");

    let err = control_string(&mut instance, "retry_policy", "sockerr").unwrap_err();
    assert_eq!(err.code(), "invalid_argument");

    control_string(&mut instance, "detailed_errcodes", "true").expect("detailed");
    let err = control_string(&mut instance, "retry_policy", "sockerr").unwrap_err();
    assert_eq!(err.code(), "bad_argument");
}

#[test]
fn string_keys_cover_each_converter() {
    let mut instance = Instance::detached();
    let pairs = [
        ("compression", "inflate_only"),
        ("error_thresh_count", "7"),
        ("http_urlmode", "1"),
        ("retry_backoff", "2.5"),
        ("console_log_level", "2"),
        ("sasl_mech_force", "PLAIN"),
        ("randomize_nodes", "false"),
        ("retry_policy", "maperr:get"),
    ];
    for (key, text) in pairs {
        control_string(&mut instance, key, text).unwrap_or_else(|e| panic!("{key}: {e}"));
    }

    let settings = instance.settings();
    assert_eq!(settings.compression, Compression::IN);
    assert_eq!(settings.config_error_threshold, 7);
    assert_eq!(settings.http_urltype, 1);
    assert_eq!(settings.retry_backoff, 2.5);
    assert!(settings.logger.is_some());
    assert_eq!(settings.sasl_mech_force.as_deref(), Some("PLAIN"));
    assert!(!settings.randomize_bootstrap_nodes);
    assert_eq!(settings.retry.get(RetryReason::MapErr), RetryPolicy::Get);
}
